/// Centre of the flower: the middle of the area above the border frame.
pub fn flower_center(bounds: Size) -> Point {
    let frame_top = bounds.height as i32
        - crate::status::BORDER_HEIGHT as i32
        - crate::status::MARGIN;
    Point::new(bounds.width as f64 / 2.0, frame_top.max(0) as f64 / 2.0)
}

impl<S> WatchfaceApp<S>
where
    S: SettingsStore,
{
    /// Draws one frame from the current state.
    ///
    /// The flower layout is checked before the first draw call, so a bad
    /// configuration leaves the canvas untouched and the frame is skipped.
    pub fn render<D>(&self, target: &mut D) -> Result<(), RenderError<D::Error>>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let state = &self.state;
        let settings = &state.settings;
        let petals = self
            .flower
            .layout(flower_center(state.bounds), &self.animation)
            .inspect_err(|err| warn!("watchface: frame skipped: {:?}", err))?;

        let layout = StatusLayout::new(state.bounds);
        let snapshot = state.status_snapshot();

        for layer in self.config.layers {
            match *layer {
                FaceLayer::Background => target
                    .clear(color::to_rgb888(settings.background_color))
                    .map_err(RenderError::Draw)?,
                FaceLayer::Status(status) => draw_layer(
                    target,
                    status,
                    &layout,
                    &snapshot,
                    &self.config.status_palette,
                )
                .map_err(RenderError::Draw)?,
                FaceLayer::Flower => self.flower.draw_petals(
                    target,
                    &petals,
                    &self.animation,
                    color::to_rgb888(settings.time_color),
                )?,
                FaceLayer::Time => {
                    if let Some(now) = self.now {
                        let label = time_label(&now, settings.use_24_hour);
                        draw_centered(
                            target,
                            &label,
                            time_anchor(state.bounds),
                            TIME_FONT,
                            color::to_rgb888(settings.time_color),
                        )
                        .map_err(RenderError::Draw)?;
                    }
                }
                FaceLayer::Date => {
                    if let Some(now) = self.now {
                        let label = date_label(&now);
                        draw_centered(
                            target,
                            &label,
                            date_anchor(state.bounds),
                            DATE_FONT,
                            color::to_rgb888(settings.date_color),
                        )
                        .map_err(RenderError::Draw)?;
                    }
                }
            }
        }

        Ok(())
    }
}
