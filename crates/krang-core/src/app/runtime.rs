impl<S> WatchfaceApp<S>
where
    S: SettingsStore,
{
    pub fn new(mut store: S, config: WatchfaceConfig, bounds: Size) -> Self {
        let settings = load_persisted(&mut store);
        info!(
            "watchface: start {}x{} bg=#{:06X} 24h={}",
            bounds.width, bounds.height, settings.background_color, settings.use_24_hour
        );

        Self {
            store,
            flower: Flower::new(config.flower),
            config,
            state: RenderState {
                bounds,
                battery: BatteryChargeState::default(),
                connected: false,
                settings,
            },
            animation: AnimationState::new(config.direction),
            now: None,
            pending_redraw: true,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn settings(&self) -> DisplaySettings {
        self.state.settings
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn config(&self) -> &WatchfaceConfig {
        &self.config
    }

    pub fn now(&self) -> Option<NaiveDateTime> {
        self.now
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mark_dirty(&mut self) {
        self.pending_redraw = true;
    }

    /// Wall-clock tick; `units_elapsed` animation steps have passed since the
    /// previous one.
    pub fn on_tick(&mut self, now: NaiveDateTime, units_elapsed: i32) {
        self.now = Some(now);
        self.animation.on_tick(units_elapsed);
        self.mark_dirty();
    }

    pub fn on_battery(&mut self, battery: BatteryChargeState) {
        if self.state.battery == battery {
            return;
        }
        debug!(
            "watchface: battery {}% charging={}",
            battery.charge_percent, battery.is_charging
        );
        self.state.battery = battery;
        self.mark_dirty();
    }

    pub fn on_connection(&mut self, connected: bool) {
        if self.state.connected == connected {
            return;
        }
        info!("watchface: connected={}", connected);
        self.state.connected = connected;
        self.mark_dirty();
    }

    /// Persists a sparse update and adopts the reloaded settings.
    ///
    /// On a store error the settings are still reloaded, so fields written
    /// before the failure take effect once the store is customized.
    pub fn on_settings_update(&mut self, update: &SettingsUpdate) -> Result<(), S::Error> {
        let result = apply_incoming_settings(&mut self.store, update);
        let outcome = match result {
            Ok(settings) => {
                self.state.settings = settings;
                Ok(())
            }
            Err(err) => {
                warn!("watchface: settings update failed: {:?}", err);
                self.state.settings = load_persisted(&mut self.store);
                Err(err)
            }
        };
        self.mark_dirty();
        outcome
    }

    /// The store changed behind our back; re-read it.
    pub fn on_settings_changed(&mut self) {
        self.state.settings = load_persisted(&mut self.store);
        self.mark_dirty();
    }

    /// Decodes a companion message and applies it. A malformed message
    /// changes nothing.
    pub fn on_message(&mut self, message: &[u8]) -> Result<(), InboxError<S::Error>> {
        let update = decode_settings_update(message).map_err(|err| {
            warn!("watchface: rejected message: {:?}", err);
            InboxError::Message(err)
        })?;
        self.on_settings_update(&update).map_err(InboxError::Store)
    }

    /// Drains the dirty flag: one `RenderRequested` per batch of changes.
    pub fn poll_redraw(&mut self) -> TickResult {
        if self.pending_redraw {
            self.pending_redraw = false;
            return TickResult::RenderRequested;
        }
        TickResult::NoRender
    }
}
