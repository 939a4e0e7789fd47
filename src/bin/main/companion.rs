use embassy_net::{
    Stack,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Timer;
use krang_hal_esp32s3::network::companion::{
    COMPANION_PORT, MAX_MESSAGE_LEN, MessageBuffer, buffer_message,
};
use log::{debug, info, warn};

const BIND_RETRY_SECS: u64 = 2;

/// Latest unread settings datagram; a newer one replaces it.
pub type CompanionInbox = Signal<CriticalSectionRawMutex, MessageBuffer>;

/// Receives settings dictionaries over UDP and hands them to the UI loop.
pub async fn companion_listener(stack: Stack<'_>, inbox: &'static CompanionInbox) -> ! {
    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; MAX_MESSAGE_LEN * 2];
    let mut tx_buffer = [0u8; 64];
    let mut payload = [0u8; MAX_MESSAGE_LEN];

    stack.wait_config_up().await;

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    while let Err(err) = socket.bind(COMPANION_PORT) {
        warn!("companion: bind {} failed: {:?}", COMPANION_PORT, err);
        Timer::after_secs(BIND_RETRY_SECS).await;
    }
    info!("companion: listening on udp/{}", COMPANION_PORT);

    loop {
        match socket.recv_from(&mut payload).await {
            Ok((len, meta)) => {
                debug!("companion: {} bytes from {}", len, meta.endpoint);
                if let Some(datagram) = buffer_message(&payload[..len]) {
                    inbox.signal(datagram);
                }
            }
            Err(err) => warn!("companion: receive failed: {:?}", err),
        }
    }
}
