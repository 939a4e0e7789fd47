#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_time::{Duration as EmbassyDuration, Timer, WithTimeout};
use embedded_graphics::geometry::Size;
use esp_hal::{
    analog::adc::{Adc, AdcConfig, Attenuation},
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    spi::master::Spi,
    time::{Duration as HalDuration, Instant, Rate},
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController};
use krang_core::{
    app::{WatchfaceApp, WatchfaceConfig},
    render::TickResult,
};
use krang_hal_esp32s3::{
    battery::{BatterySensor, VoltageDivider},
    network::{ConnectivityHandle, WifiConfig},
    platform::display::MipDisplay,
};
use log::{LevelFilter, info, warn};
use lpm013m126::{
    FrameBuffer,
    protocol::{HEIGHT, WIDTH},
};
use static_cell::StaticCell;

use clock::BoardClock;
use companion::{CompanionInbox, companion_listener};
use settings_store::BootSettingsStore;

#[path = "main/clock.rs"]
mod clock;
#[path = "main/companion.rs"]
mod companion;
#[path = "main/settings_store.rs"]
mod settings_store;

const DISPLAY_SPI_HZ: u32 = 1_000_000;
const UI_POLL_INTERVAL_MS: u64 = 50;
const VCOM_REFRESH_INTERVAL_MS: u64 = 1_000;
const BATTERY_POLL_INTERVAL_SECS: u64 = 30;
/// ADC1 full-scale reading at 11 dB attenuation.
const ADC_FULL_SCALE_MV: u32 = 3_100;
const ADC_MAX_RAW: u32 = 4_095;
const WIFI_RETRY_BACKOFF_MIN_SECS: u64 = 2;
const WIFI_RETRY_BACKOFF_MAX_SECS: u64 = 120;
const NETWORK_POLL_INTERVAL_MS: u64 = 500;
const DHCP_TIMEOUT_SECS: u64 = 15;

const WIFI_SSID: &str = env!(
    "KRANGFACE_WIFI_SSID",
    "Set KRANGFACE_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "KRANGFACE_WIFI_PASSWORD",
    "Set KRANGFACE_WIFI_PASSWORD in your environment before building/flashing."
);
const WIFI_CONFIG: WifiConfig = WifiConfig::new(WIFI_SSID, WIFI_PASSWORD);

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static COMPANION_INBOX: CompanionInbox = CompanionInbox::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

fn adc_millivolts(raw: u16) -> u16 {
    (raw as u32 * ADC_FULL_SCALE_MV / ADC_MAX_RAW).min(u16::MAX as u32) as u16
}

fn wifi_retry_backoff_secs(consecutive_failures: u32) -> u64 {
    // 2, 4, 8, 16, 32, 64, 120, 120, ...
    let shift = consecutive_failures.min(6);
    WIFI_RETRY_BACKOFF_MIN_SECS
        .saturating_mul(1u64 << shift)
        .min(WIFI_RETRY_BACKOFF_MAX_SECS)
}

async fn wait_before_wifi_retry(consecutive_failures: &mut u32) {
    let delay_secs = wifi_retry_backoff_secs(*consecutive_failures);
    *consecutive_failures = consecutive_failures.saturating_add(1);
    info!(
        "wifi retrying in {}s (consecutive_failures={})",
        delay_secs, *consecutive_failures
    );
    Timer::after_secs(delay_secs).await;
}

async fn wifi_connection_loop(
    wifi_controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    connectivity: &'static ConnectivityHandle,
) -> ! {
    let mut consecutive_failures = 0u32;

    loop {
        connectivity.mark_connecting();

        if !wifi_controller.is_started().unwrap_or(false) {
            if let Err(err) = wifi_controller.start_async().await {
                info!("wifi start failed: {:?}", err);
                connectivity.mark_disconnected();
                wait_before_wifi_retry(&mut consecutive_failures).await;
                continue;
            }
        }

        if let Err(err) = wifi_controller.connect_async().await {
            info!("wifi connect failed: {:?}", err);
            connectivity.mark_disconnected();
            let _ = wifi_controller.disconnect_async().await;
            wait_before_wifi_retry(&mut consecutive_failures).await;
            continue;
        }

        match stack
            .wait_config_up()
            .with_timeout(EmbassyDuration::from_secs(DHCP_TIMEOUT_SECS))
            .await
        {
            Ok(()) => {
                connectivity.update_link_ip(stack.is_link_up(), stack.config_v4().is_some());
                info!("wifi connected and dhcp ready");
            }
            Err(_) => {
                info!("dhcp timeout; forcing reconnect");
                connectivity.update_link_ip(stack.is_link_up(), false);
                let _ = wifi_controller.disconnect_async().await;
                wait_before_wifi_retry(&mut consecutive_failures).await;
                continue;
            }
        }

        consecutive_failures = 0;

        loop {
            let link_up = stack.is_link_up();
            let has_ipv4 = stack.config_v4().is_some();
            let is_connected = matches!(wifi_controller.is_connected(), Ok(true));

            connectivity.update_link_ip(link_up, has_ipv4);

            if !(link_up && has_ipv4 && is_connected) {
                info!(
                    "wifi state lost (link_up={} has_ipv4={} connected={}); reconnecting",
                    link_up, has_ipv4, is_connected
                );
                break;
            }

            Timer::after_millis(NETWORK_POLL_INTERVAL_MS).await;
        }

        connectivity.mark_disconnected();
        let _ = wifi_controller.disconnect_async().await;
        wait_before_wifi_retry(&mut consecutive_failures).await;
    }
}

async fn halt() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "the framebuffer and socket buffers live in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: krangface starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // CLK=GPIO13, SI=GPIO14, SCS=GPIO15, DISP=GPIO2
    let disp = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    let cs = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());

    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        // LPM013M126 samples on the rising edge with CLK idle low.
        .with_mode(esp_hal::spi::Mode::_0);

    let spi = match Spi::new(peripherals.SPI2, spi_config) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO13)
            .with_mosi(peripherals.GPIO14),
        Err(err) => {
            info!("display spi config failed: {:?}", err);
            halt().await
        }
    };

    let mut delay = Delay::new();

    let mut display = MipDisplay::new(spi, disp, cs);
    let mut display_fault_logged = false;
    esp_println::println!("display: init begin (CLK=13 SI=14 SCS=15 DISP=2)");
    if let Err(err) = display.initialize(&mut delay) {
        esp_println::println!("display: initialize failed");
        info!("display initialize failed: {:?}", err);
        display_fault_logged = true;
    } else if let Err(err) = display.clear_all(&mut delay) {
        info!("display clear failed: {:?}", err);
        display_fault_logged = true;
    } else {
        esp_println::println!("display: init ok");
    }

    // Battery divider tap on GPIO1 (ADC1), charger STAT on GPIO5.
    let mut adc_config = AdcConfig::new();
    let mut battery_pin = adc_config.enable_pin(peripherals.GPIO1, Attenuation::_11dB);
    let mut adc = Adc::new(peripherals.ADC1, adc_config);
    let charge_detect = Input::new(
        peripherals.GPIO5,
        InputConfig::default().with_pull(Pull::Up),
    );
    let mut battery = BatterySensor::new(charge_detect, VoltageDivider::HALF);

    let store = BootSettingsStore::open();
    let store_kind = store.kind();
    let mut app = WatchfaceApp::new(
        store,
        WatchfaceConfig::default(),
        Size::new(WIDTH as u32, HEIGHT as u32),
    );
    info!(
        "settings: {} store, {:?}",
        store_kind,
        app.settings()
    );

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            halt().await
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                halt().await
            }
        };

    let client_config = ClientConfig::default()
        .with_ssid(WIFI_CONFIG.ssid.into())
        .with_password(WIFI_CONFIG.password.into());
    let wifi_mode = ModeConfig::Client(client_config);
    if let Err(err) = wifi_controller.set_config(&wifi_mode) {
        info!("wifi mode config failed: {:?}", err);
        halt().await
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x4B52_414E_4746_4143,
    );

    let mut frame = FrameBuffer::new();
    let mut clock = BoardClock::from_build_time();
    let mut last_connectivity_revision = u32::MAX;
    let mut battery_due = true;
    let mut last_battery_poll = Instant::now();
    let mut last_panel_write = Instant::now();

    info!("Watchface started: spi_hz={}", DISPLAY_SPI_HZ);
    info!("Display pins: CLK=GPIO13 SI=GPIO14 SCS=GPIO15 DISP=GPIO2");
    info!("Battery pins: ADC=GPIO1 CHG=GPIO5");
    info!("Wi-Fi bootstrap configured from env");

    CONNECTIVITY.mark_connecting();

    let net_future = net_runner.run();
    let wifi_future = wifi_connection_loop(&mut wifi_controller, stack, &CONNECTIVITY);
    let companion_future = companion_listener(stack, &COMPANION_INBOX);
    let ui_future = async {
        loop {
            if let Some((now, seconds)) = clock.poll_tick() {
                app.on_tick(now, seconds);
            }

            if last_battery_poll.elapsed() >= HalDuration::from_secs(BATTERY_POLL_INTERVAL_SECS) {
                battery_due = true;
                last_battery_poll = Instant::now();
            }
            if battery_due {
                // The first call starts a conversion; the value arrives on a later poll.
                if let Ok(raw) = adc.read_oneshot(&mut battery_pin) {
                    battery_due = false;
                    if let Some(state) = battery.update(adc_millivolts(raw)) {
                        info!(
                            "battery: {}% charging={}",
                            state.charge_percent, state.is_charging
                        );
                        app.on_battery(state);
                    }
                }
            }

            let connectivity = CONNECTIVITY.snapshot();
            if connectivity.revision != last_connectivity_revision {
                last_connectivity_revision = connectivity.revision;
                info!(
                    "connectivity: {:?} connected={}",
                    connectivity.state,
                    connectivity.connected()
                );
                app.on_connection(connectivity.connected());
            }

            if let Some(datagram) = COMPANION_INBOX.try_take() {
                match app.on_message(&datagram) {
                    Ok(()) => info!("companion: applied {:?}", app.settings()),
                    Err(err) => warn!("companion: message not applied: {:?}", err),
                }
            }

            if app.poll_redraw() == TickResult::RenderRequested {
                match app.render(&mut frame) {
                    Ok(()) => match display.flush_frame(&frame, &mut delay) {
                        Ok(()) => {
                            last_panel_write = Instant::now();
                            display_fault_logged = false;
                        }
                        Err(err) => {
                            if !display_fault_logged {
                                warn!("display flush failed: {:?}", err);
                                display_fault_logged = true;
                            }
                        }
                    },
                    Err(err) => warn!("render failed: {:?}", err),
                }
            }

            if last_panel_write.elapsed() >= HalDuration::from_millis(VCOM_REFRESH_INTERVAL_MS) {
                if let Err(err) = display.refresh_vcom(&mut delay) {
                    if !display_fault_logged {
                        warn!("display vcom refresh failed: {:?}", err);
                        display_fault_logged = true;
                    }
                }
                last_panel_write = Instant::now();
            }

            Timer::after_millis(UI_POLL_INTERVAL_MS).await;
        }
    };

    let _ = embassy_futures::join::join4(net_future, wifi_future, companion_future, ui_future).await;
    unreachable!()
}
