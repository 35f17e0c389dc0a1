//! Fan-out of text mutations to room peers.

use std::sync::Arc;

use crate::domain::{ConnectionId, PeerSender, RoomName};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::usecase::ConnectionRegistry;

/// Delivers a text mutation to every connection in a room except its origin.
///
/// Fire-and-forget: no acknowledgment, no retry. Each receiving connection's
/// channel is FIFO and publishes from one sender happen sequentially on that
/// sender's event loop, so one origin's successive updates are never
/// reordered. Ordering across different origins is unspecified
/// (last-applied-wins at the receiving client).
pub struct TextBroadcaster {
    registry: Arc<ConnectionRegistry>,
    pusher: Arc<dyn PeerSender>,
}

impl TextBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>, pusher: Arc<dyn PeerSender>) -> Self {
        Self { registry, pusher }
    }

    /// Deliver `text` to every current member of `room` except `origin`.
    pub async fn publish(&self, room: &RoomName, origin: &ConnectionId, text: &str) {
        let targets: Vec<ConnectionId> = self
            .registry
            .members_of(room)
            .await
            .into_iter()
            .filter(|member| member != origin)
            .collect();

        if targets.is_empty() {
            return;
        }

        let payload = ServerEvent::TextUpdate {
            text: text.to_string(),
        }
        .to_json();

        tracing::debug!(
            "Broadcasting text update from '{}' to {} peer(s) in room '{}'",
            origin,
            targets.len(),
            room
        );
        self.pusher.broadcast(&targets, &payload).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::pusher::WebSocketPeerSender;
    use tokio::sync::mpsc;

    struct Peer {
        id: ConnectionId,
        rx: mpsc::UnboundedReceiver<String>,
    }

    impl Peer {
        fn drain(&mut self) -> Vec<String> {
            let mut out = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                out.push(msg);
            }
            out
        }
    }

    async fn setup() -> (Arc<ConnectionRegistry>, TextBroadcaster, Arc<WebSocketPeerSender>) {
        let pusher = Arc::new(WebSocketPeerSender::new());
        let registry = Arc::new(ConnectionRegistry::new(pusher.clone()));
        let broadcaster = TextBroadcaster::new(registry.clone(), pusher.clone());
        (registry, broadcaster, pusher)
    }

    async fn join(
        registry: &ConnectionRegistry,
        pusher: &WebSocketPeerSender,
        room: &str,
    ) -> Peer {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register(id, tx).await;
        registry.join(id, room).await;
        let mut peer = Peer { id, rx };
        peer.drain(); // discard join-time count announcements
        peer
    }

    #[tokio::test]
    async fn test_publish_reaches_peers_but_not_origin() {
        // given:
        let (registry, broadcaster, pusher) = setup().await;
        let mut a = join(&registry, &pusher, "shared").await;
        let mut b = join(&registry, &pusher, "shared").await;
        a.drain();

        // when:
        broadcaster
            .publish(&RoomName::sanitize("shared"), &a.id, "hello")
            .await;

        // then:
        assert_eq!(
            b.drain(),
            vec![r#"{"type":"text-update","text":"hello"}"#.to_string()]
        );
        assert!(a.drain().is_empty(), "origin must not receive its own edit");
    }

    #[tokio::test]
    async fn test_publish_does_not_cross_rooms() {
        // given:
        let (registry, broadcaster, pusher) = setup().await;
        let a = join(&registry, &pusher, "here").await;
        let mut elsewhere = join(&registry, &pusher, "there").await;

        // when:
        broadcaster
            .publish(&RoomName::sanitize("here"), &a.id, "private")
            .await;

        // then:
        assert!(elsewhere.drain().is_empty());
    }

    #[tokio::test]
    async fn test_publish_preserves_sender_order() {
        // given:
        let (registry, broadcaster, pusher) = setup().await;
        let a = join(&registry, &pusher, "shared").await;
        let mut b = join(&registry, &pusher, "shared").await;
        let room = RoomName::sanitize("shared");

        // when:
        for text in ["one", "two", "three"] {
            broadcaster.publish(&room, &a.id, text).await;
        }

        // then: receiver sees the origin's emission order
        let received = b.drain();
        assert_eq!(
            received,
            vec![
                r#"{"type":"text-update","text":"one"}"#.to_string(),
                r#"{"type":"text-update","text":"two"}"#.to_string(),
                r#"{"type":"text-update","text":"three"}"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_to_empty_room_is_noop() {
        // given:
        let (_registry, broadcaster, _pusher) = setup().await;

        // when / then: no panic
        broadcaster
            .publish(&RoomName::sanitize("empty"), &ConnectionId::new(), "void")
            .await;
    }

    #[tokio::test]
    async fn test_departed_connection_misses_updates() {
        // given:
        let (registry, broadcaster, pusher) = setup().await;
        let a = join(&registry, &pusher, "shared").await;
        let mut b = join(&registry, &pusher, "shared").await;
        registry.leave(&b.id).await;
        b.drain();

        // when:
        broadcaster
            .publish(&RoomName::sanitize("shared"), &a.id, "after you left")
            .await;

        // then:
        assert!(b.drain().is_empty());
    }
}
