//! Flood-relay engine
//!
//! Turns raw inbound bytes into local deliveries and, where the hop
//! budget allows, rebroadcasts. Originated traffic enters through the
//! `send_*` operations and flows through the same outbound queue as
//! relayed traffic.

use aidmesh_crypto::{CryptoProvider, Keyring};
use aidmesh_protocol::{
    decode, encode, generate_id, MeshMessage, MessageKind, Priority, TTL_ACK, TTL_DM, TTL_SOS,
    TTL_VOICE,
};
use aidmesh_transport::RadioDriver;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, watch, Notify};
use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::queue::{OutboundQueue, QueueStats, QueuedMessage, DEFAULT_MAX_ATTEMPTS};
use crate::rate::OriginationLimiter;
use crate::store::StateStore;

/// Jitter window for NORMAL/LOW rebroadcast, milliseconds
pub const JITTER_MIN_MS: u64 = 200;
pub const JITTER_MAX_MS: u64 = 800;

/// Outbound pump wakeup interval when idle
const PUMP_INTERVAL_MS: u64 = 200;

/// Whether unencrypted direct/group payloads may ever hit the air
///
/// Plaintext over a public broadcast medium is the primary safety risk
/// in this subsystem, so the permissive variant is a deliberate opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaintextPolicy {
    /// Origination without a resolvable key fails with
    /// [`RelayError::NoKey`]
    #[default]
    Refuse,
    /// Degrade to plaintext transmission when no key resolves
    AllowPlaintext,
}

/// What a subscriber receives: the post-relay envelope plus the
/// recovered plaintext when a key was available
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: MeshMessage,
    pub plaintext: Option<Vec<u8>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The relay engine
///
/// An explicitly constructed instance; nothing here is process-global,
/// so tests can run several isolated relays side by side.
pub struct MeshRelay {
    device_id: String,
    driver: Arc<dyn RadioDriver>,
    crypto: Arc<dyn CryptoProvider>,
    keyring: RwLock<Keyring>,
    queue: Arc<Mutex<OutboundQueue>>,
    limiter: Mutex<OriginationLimiter>,
    policy: PlaintextPolicy,
    subscribers: Mutex<HashMap<MessageKind, Vec<mpsc::UnboundedSender<Delivery>>>>,
    outbound_wake: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
}

impl MeshRelay {
    pub fn new(
        device_id: impl Into<String>,
        driver: Arc<dyn RadioDriver>,
        crypto: Arc<dyn CryptoProvider>,
        store: Arc<dyn StateStore>,
        policy: PlaintextPolicy,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        MeshRelay {
            device_id: device_id.into(),
            driver,
            crypto,
            keyring: RwLock::new(Keyring::new()),
            queue: Arc::new(Mutex::new(OutboundQueue::load(store))),
            limiter: Mutex::new(OriginationLimiter::new()),
            policy,
            subscribers: Mutex::new(HashMap::new()),
            outbound_wake: Arc::new(Notify::new()),
            shutdown_tx,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Register for local deliveries of one message kind.
    pub fn subscribe(&self, kind: MessageKind) -> mpsc::UnboundedReceiver<Delivery> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.subscribers).entry(kind).or_default().push(tx);
        rx
    }

    /// Install a shared key for a paired peer.
    pub fn insert_peer_key(&self, peer_id: impl Into<String>, key: aidmesh_crypto::Key) {
        if let Ok(mut keyring) = self.keyring.write() {
            keyring.insert_peer(peer_id, key);
        }
    }

    /// Install a group key.
    pub fn insert_group_key(&self, group_id: impl Into<String>, key: aidmesh_crypto::Key) {
        if let Ok(mut keyring) = self.keyring.write() {
            keyring.insert_group(group_id, key);
        }
    }

    /// Process raw bytes heard on the radio.
    ///
    /// Returns `true` when the message produced an effect (local
    /// delivery, and possibly a scheduled rebroadcast); `false` for
    /// malformed input and duplicates.
    pub async fn on_receive(&self, bytes: &[u8]) -> bool {
        let Some(mut message) = decode(bytes) else {
            return false;
        };

        {
            let mut queue = lock(&self.queue);
            if queue.is_seen(message.id()) {
                debug!(id = message.id(), "duplicate dropped");
                return false;
            }
            queue.mark_seen(message.id());
        }

        if message.ttl() == 0 {
            // hop budget exhausted: never forwarded, but local delivery
            // is not gated by forwarding eligibility
            self.dispatch(&message);
            return true;
        }

        *message.ttl_mut() -= 1;
        // hop comes off the wire; a hostile frame can already carry
        // u8::MAX and must not wrap (or panic) here
        let hop = message.hop().saturating_add(1);
        *message.hop_mut() = hop;
        self.dispatch(&message);

        if message.ttl() > 0 {
            // voice chunks are a single-hop shout, not a mesh-wide flood
            let near_only = matches!(message, MeshMessage::VoicePing { .. });
            if near_only && message.hop() > 1 {
                debug!(id = message.id(), hop = message.hop(), "voice chunk past hop limit");
            } else {
                self.schedule_rebroadcast(message);
            }
        }
        true
    }

    fn dispatch(&self, message: &MeshMessage) {
        let delivery = Delivery {
            message: message.clone(),
            plaintext: self.recover_plaintext(message),
        };
        let mut subscribers = lock(&self.subscribers);
        if let Some(list) = subscribers.get_mut(&message.kind()) {
            list.retain(|tx| tx.send(delivery.clone()).is_ok());
        }
    }

    /// Plaintext for chat payloads: hex-decoded directly when the
    /// envelope is unencrypted, opened via the crypto collaborator
    /// when a key resolves, `None` otherwise. Missing keys are never
    /// an error here.
    fn recover_plaintext(&self, message: &MeshMessage) -> Option<Vec<u8>> {
        let (to, group, encrypted, ciphertext, nonce) = match message {
            MeshMessage::Dm {
                to,
                group,
                encrypted,
                ciphertext,
                nonce,
                ..
            } => (to.as_deref(), group.as_deref(), *encrypted, ciphertext, nonce),
            MeshMessage::GroupMessage {
                group,
                encrypted,
                ciphertext,
                nonce,
                ..
            } => (None, Some(group.as_str()), *encrypted, ciphertext, nonce),
            _ => return None,
        };

        let payload = hex::decode(ciphertext).ok()?;
        if !encrypted {
            return Some(payload);
        }
        let nonce = hex::decode(nonce).ok()?;
        let keyring = self.keyring.read().ok()?;
        let key = keyring.resolve(to, group)?;
        self.crypto.decrypt(key, &nonce, &payload)
    }

    fn schedule_rebroadcast(&self, message: MeshMessage) {
        let priority = message.priority();
        if priority == Priority::High {
            // no artificial delay for distress traffic
            lock(&self.queue).enqueue_seen(message, priority, DEFAULT_MAX_ATTEMPTS);
            self.outbound_wake.notify_one();
            return;
        }

        // jittered to desynchronize the many devices that heard the
        // same broadcast
        let delay =
            Duration::from_millis(rand::thread_rng().gen_range(JITTER_MIN_MS..=JITTER_MAX_MS));
        let queue = Arc::clone(&self.queue);
        let wake = Arc::clone(&self.outbound_wake);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    lock(&queue).enqueue_seen(message, priority, DEFAULT_MAX_ATTEMPTS);
                    wake.notify_one();
                }
                _ = shutdown_rx.changed() => {
                    debug!("rebroadcast cancelled by shutdown");
                }
            }
        });
    }

    fn ensure_running(&self) -> Result<()> {
        if *self.shutdown_tx.borrow() {
            return Err(RelayError::ShutDown);
        }
        Ok(())
    }

    fn check_rate(&self, kind: MessageKind) -> Result<()> {
        lock(&self.limiter)
            .check(kind)
            .map_err(|limit| RelayError::RateLimited { kind, limit })
    }

    fn originate(&self, message: MeshMessage, priority: Priority) {
        if !lock(&self.queue).enqueue(message, priority, DEFAULT_MAX_ATTEMPTS) {
            // fresh ids collide only by construction error
            debug!("originated id already seen, not queued");
            return;
        }
        self.outbound_wake.notify_one();
    }

    /// Originate a distress beacon. Location fields stay empty when no
    /// fix is available; that never blocks origination.
    pub fn send_sos(
        &self,
        lat: Option<f64>,
        lon: Option<f64>,
        statuses: Vec<String>,
    ) -> Result<String> {
        self.ensure_running()?;
        self.check_rate(MessageKind::Sos)?;
        let id = generate_id();
        self.originate(
            MeshMessage::Sos {
                id: id.clone(),
                ttl: TTL_SOS,
                hop: 0,
                ts: now_ms(),
                lat,
                lon,
                statuses,
            },
            Priority::High,
        );
        Ok(id)
    }

    /// Acknowledge a previously received message id.
    pub fn ack(&self, reference: impl Into<String>) -> Result<String> {
        self.ensure_running()?;
        let id = generate_id();
        self.originate(
            MeshMessage::Ack {
                id: id.clone(),
                ttl: TTL_ACK,
                hop: 0,
                reference: reference.into(),
            },
            Priority::High,
        );
        Ok(id)
    }

    /// Originate a direct or group chat message.
    ///
    /// The payload is sealed via the crypto collaborator when a key
    /// resolves for `to`/`group`; otherwise transmission only proceeds
    /// under [`PlaintextPolicy::AllowPlaintext`].
    pub fn send_dm(
        &self,
        to: Option<String>,
        group: Option<String>,
        plaintext: &[u8],
    ) -> Result<String> {
        self.ensure_running()?;
        self.check_rate(MessageKind::Dm)?;

        let sealed = self
            .keyring
            .read()
            .ok()
            .and_then(|keyring| {
                keyring
                    .resolve(to.as_deref(), group.as_deref())
                    .and_then(|key| self.crypto.encrypt(key, plaintext))
            });

        let (encrypted, ciphertext, nonce) = match sealed {
            Some(sealed) => (true, hex::encode(sealed.ciphertext), hex::encode(sealed.nonce)),
            None => {
                if self.policy != PlaintextPolicy::AllowPlaintext {
                    return Err(RelayError::NoKey);
                }
                warn!("transmitting unencrypted chat payload under explicit policy opt-in");
                (false, hex::encode(plaintext), String::new())
            }
        };

        let id = generate_id();
        self.originate(
            MeshMessage::Dm {
                id: id.clone(),
                ttl: TTL_DM,
                hop: 0,
                to,
                group,
                encrypted,
                ciphertext,
                nonce,
            },
            Priority::Normal,
        );
        Ok(id)
    }

    /// Originate one voice clip as ordered chunks. Voice travels
    /// unencrypted (a near-field shout); one call consumes one unit of
    /// the per-minute clip budget regardless of chunk count.
    pub fn send_voice_ping(&self, to: Option<String>, chunks: &[Vec<u8>]) -> Result<Vec<String>> {
        self.ensure_running()?;
        self.check_rate(MessageKind::VoicePing)?;

        let total = chunks.len() as u16;
        let mut ids = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let id = generate_id();
            self.originate(
                MeshMessage::VoicePing {
                    id: id.clone(),
                    ttl: TTL_VOICE,
                    hop: 0,
                    to: to.clone(),
                    encrypted: false,
                    idx: idx as u16,
                    total,
                    chunk: hex::encode(chunk),
                },
                Priority::Low,
            );
            ids.push(id);
        }
        Ok(ids)
    }

    /// Pop the next transmittable outbound entry. The background pump
    /// normally drives this; hosts wiring their own transport loop can
    /// call it directly.
    pub fn next_outbound(&self) -> Option<QueuedMessage> {
        lock(&self.queue).dequeue()
    }

    pub fn queue_stats(&self) -> QueueStats {
        lock(&self.queue).stats()
    }

    /// Empty all lanes and forget all seen ids. Test/reset flows only.
    pub fn clear(&self) {
        lock(&self.queue).clear();
        lock(&self.limiter).clear();
    }

    /// Start discovery and the inbound/outbound pumps.
    pub async fn start(self: &Arc<Self>) {
        debug!(device = %self.device_id, "relay starting");
        self.driver.start_discovery().await;

        let relay = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut rx = relay.driver.subscribe();
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    received = rx.recv() => match received {
                        Some(bytes) => {
                            relay.on_receive(&bytes).await;
                        }
                        None => break,
                    },
                }
            }
        });

        let relay = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut tick =
                tokio::time::interval(Duration::from_millis(PUMP_INTERVAL_MS));
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = relay.outbound_wake.notified() => {}
                    _ = tick.tick() => {}
                }
                relay.drain_outbound().await;
            }
        });
    }

    async fn drain_outbound(&self) {
        loop {
            let Some(queued) = lock(&self.queue).dequeue() else {
                break;
            };
            let bytes = encode(&queued.message);
            if !self.driver.send(bytes, None).await {
                lock(&self.queue).retry(queued);
            }
        }
    }

    /// Stop discovery and cancel the pumps and any pending jittered
    /// rebroadcasts. Messages in flight at shutdown are dropped;
    /// best-effort delivery already allows that loss.
    pub async fn shutdown(&self) {
        debug!(device = %self.device_id, "relay shutting down");
        let _ = self.shutdown_tx.send(true);
        self.driver.stop_discovery().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use aidmesh_crypto::{Key, NoopCrypto, Sealed};
    use aidmesh_transport::NoopDriver;

    /// Toy cipher for exercising the seal/open path
    struct XorCrypto;

    impl CryptoProvider for XorCrypto {
        fn encrypt(&self, key: &Key, plaintext: &[u8]) -> Option<Sealed> {
            let ciphertext = plaintext
                .iter()
                .zip(key.as_bytes().iter().cycle())
                .map(|(p, k)| p ^ k)
                .collect();
            Some(Sealed {
                ciphertext,
                nonce: vec![7; 4],
            })
        }

        fn decrypt(&self, key: &Key, _nonce: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>> {
            Some(
                ciphertext
                    .iter()
                    .zip(key.as_bytes().iter().cycle())
                    .map(|(c, k)| c ^ k)
                    .collect(),
            )
        }

        fn derive_shared_key(&self, peer_public: &[u8], _my_private: &[u8]) -> Option<Key> {
            Some(Key::from_bytes(peer_public.to_vec()))
        }
    }

    fn relay_with(crypto: Arc<dyn CryptoProvider>, policy: PlaintextPolicy) -> MeshRelay {
        MeshRelay::new(
            "dev-a",
            Arc::new(NoopDriver::default()),
            crypto,
            Arc::new(MemoryStore::new()),
            policy,
        )
    }

    fn relay() -> MeshRelay {
        relay_with(Arc::new(NoopCrypto), PlaintextPolicy::Refuse)
    }

    fn sos_bytes(id: &str, ttl: u8) -> Vec<u8> {
        encode(&MeshMessage::Sos {
            id: id.to_string(),
            ttl,
            hop: 0,
            ts: 1,
            lat: Some(41.0),
            lon: Some(29.0),
            statuses: vec!["injured".into()],
        })
    }

    #[tokio::test]
    async fn test_receive_delivers_and_schedules_rebroadcast() {
        let relay = relay();
        let mut rx = relay.subscribe(MessageKind::Sos);

        assert!(relay.on_receive(&sos_bytes("sos-1", 5)).await);

        let delivery = rx.try_recv().unwrap();
        assert_eq!(delivery.message.ttl(), 4);
        assert_eq!(delivery.message.hop(), 1);
        // SOS is high priority, forwarded without jitter
        assert_eq!(relay.queue_stats().high, 1);
    }

    #[tokio::test]
    async fn test_duplicate_is_not_handled_twice() {
        let relay = relay();
        let mut rx = relay.subscribe(MessageKind::Sos);

        assert!(relay.on_receive(&sos_bytes("sos-1", 5)).await);
        assert!(!relay.on_receive(&sos_bytes("sos-1", 5)).await);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert_eq!(relay.queue_stats().high, 1);
    }

    #[tokio::test]
    async fn test_hop_at_limit_saturates() {
        let relay = relay();
        let mut rx = relay.subscribe(MessageKind::Ack);

        // well-formed frame from a hostile peer with hop already maxed
        let bytes = br#"{"t":"ACK","id":"x","ttl":3,"h":255,"r":"y"}"#;
        assert!(relay.on_receive(bytes).await);

        let delivery = rx.try_recv().unwrap();
        assert_eq!(delivery.message.hop(), u8::MAX);
        assert_eq!(delivery.message.ttl(), 2);
    }

    #[tokio::test]
    async fn test_malformed_bytes_dropped() {
        let relay = relay();
        assert!(!relay.on_receive(b"{ not a message").await);
        assert!(!relay.on_receive(b"").await);
    }

    #[tokio::test]
    async fn test_exhausted_ttl_still_delivered_locally() {
        let relay = relay();
        let mut rx = relay.subscribe(MessageKind::Sos);

        assert!(relay.on_receive(&sos_bytes("spent", 0)).await);
        assert!(rx.try_recv().is_ok());
        // marked seen, never queued
        assert_eq!(relay.queue_stats().total, 0);
        assert!(!relay.on_receive(&sos_bytes("spent", 0)).await);
    }

    #[tokio::test]
    async fn test_last_hop_not_rebroadcast() {
        let relay = relay();
        assert!(relay.on_receive(&sos_bytes("edge", 1)).await);
        // ttl 1 -> 0 after decrement: delivered but not forwarded
        assert_eq!(relay.queue_stats().total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_chunk_relayed_one_hop_only() {
        let relay = relay();
        let vp = |id: &str, hop: u8| {
            encode(&MeshMessage::VoicePing {
                id: id.to_string(),
                ttl: 3,
                hop,
                to: None,
                encrypted: false,
                idx: 0,
                total: 1,
                chunk: "ff00".into(),
            })
        };

        // first hop: forwarded (jittered, so wait out the spawn)
        assert!(relay.on_receive(&vp("vp-near", 0)).await);
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(relay.queue_stats().low, 1);

        // already one hop out: delivered but not forwarded again
        let mut rx = relay.subscribe(MessageKind::VoicePing);
        assert!(relay.on_receive(&vp("vp-far", 1)).await);
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(rx.try_recv().is_ok());
        assert_eq!(relay.queue_stats().low, 1);
    }

    #[tokio::test]
    async fn test_send_sos_enqueues_high() {
        let relay = relay();
        let id = relay.send_sos(Some(41.0), Some(29.0), vec!["trapped".into()]).unwrap();
        assert!(!id.is_empty());
        assert_eq!(relay.queue_stats().high, 1);

        let queued = relay.next_outbound().unwrap();
        assert_eq!(queued.message.id(), id);
        assert_eq!(queued.message.ttl(), TTL_SOS);
        assert_eq!(queued.message.hop(), 0);
    }

    #[tokio::test]
    async fn test_sos_rate_limited() {
        let relay = relay();
        assert!(relay.send_sos(None, None, vec![]).is_ok());
        match relay.send_sos(None, None, vec![]) {
            Err(RelayError::RateLimited { kind, limit }) => {
                assert_eq!(kind, MessageKind::Sos);
                assert_eq!(limit, 1);
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dm_without_key_refused_by_default() {
        let relay = relay();
        let err = relay
            .send_dm(Some("bob".into()), None, b"meet at the school")
            .unwrap_err();
        assert!(matches!(err, RelayError::NoKey));
        assert_eq!(relay.queue_stats().total, 0);
    }

    #[tokio::test]
    async fn test_dm_plaintext_requires_opt_in() {
        let relay = relay_with(Arc::new(NoopCrypto), PlaintextPolicy::AllowPlaintext);
        relay.send_dm(Some("bob".into()), None, b"hello").unwrap();

        let queued = relay.next_outbound().unwrap();
        match queued.message {
            MeshMessage::Dm {
                encrypted,
                ciphertext,
                ..
            } => {
                assert!(!encrypted);
                assert_eq!(hex::decode(ciphertext).unwrap(), b"hello");
            }
            other => panic!("expected DM, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dm_sealed_and_opened_with_shared_key() {
        let sender = relay_with(Arc::new(XorCrypto), PlaintextPolicy::Refuse);
        sender.insert_peer_key("bob", Key::from_bytes(vec![0x55; 8]));
        sender.send_dm(Some("bob".into()), None, b"safe house at pier 4").unwrap();

        let queued = sender.next_outbound().unwrap();
        let bytes = encode(&queued.message);

        let receiver = relay_with(Arc::new(XorCrypto), PlaintextPolicy::Refuse);
        receiver.insert_peer_key("bob", Key::from_bytes(vec![0x55; 8]));
        let mut rx = receiver.subscribe(MessageKind::Dm);

        assert!(receiver.on_receive(&bytes).await);
        let delivery = rx.try_recv().unwrap();
        assert_eq!(delivery.plaintext.unwrap(), b"safe house at pier 4");
    }

    #[tokio::test]
    async fn test_dm_without_receiver_key_delivers_envelope_only() {
        let sender = relay_with(Arc::new(XorCrypto), PlaintextPolicy::Refuse);
        sender.insert_peer_key("bob", Key::from_bytes(vec![0x55; 8]));
        sender.send_dm(Some("bob".into()), None, b"secret").unwrap();
        let bytes = encode(&sender.next_outbound().unwrap().message);

        let receiver = relay(); // no key, no crypto
        let mut rx = receiver.subscribe(MessageKind::Dm);
        assert!(receiver.on_receive(&bytes).await);
        let delivery = rx.try_recv().unwrap();
        assert!(delivery.plaintext.is_none());
    }

    #[tokio::test]
    async fn test_voice_ping_chunks_ordered() {
        let relay = relay();
        let chunks = vec![vec![1u8; 4], vec![2u8; 4], vec![3u8; 2]];
        let ids = relay.send_voice_ping(None, &chunks).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(relay.queue_stats().low, 3);

        for idx in 0..3u16 {
            match relay.next_outbound().unwrap().message {
                MeshMessage::VoicePing { idx: i, total, ttl, .. } => {
                    assert_eq!(i, idx);
                    assert_eq!(total, 3);
                    assert_eq!(ttl, TTL_VOICE);
                }
                other => panic!("expected voice ping, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_origination_fails_after_shutdown() {
        let relay = relay();
        relay.shutdown().await;
        assert!(matches!(
            relay.send_sos(None, None, vec![]),
            Err(RelayError::ShutDown)
        ));
    }

    #[tokio::test]
    async fn test_clear_resets_queue_and_budgets() {
        let relay = relay();
        relay.send_sos(None, None, vec![]).unwrap();
        relay.clear();
        assert_eq!(relay.queue_stats().total, 0);
        assert!(relay.send_sos(None, None, vec![]).is_ok());
    }
}
