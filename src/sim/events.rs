//! Outbound game events
//!
//! The simulation never talks to a HUD or leaderboard directly. It queues
//! events on a bus owned by the caller, who drains them after each frame.

use serde::{Deserialize, Serialize};

/// Notifications for HUD/leaderboard collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "camelCase")]
pub enum GameEvent {
    /// A new run was initialised
    GameStart,
    ScoreChange(u64),
    LivesChange(u32),
    /// Hero's current tier, published every frame
    LevelChange(i32),
    /// Final score, published once per run
    GameOver(u64),
}

/// FIFO queue of published events
#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: GameEvent) {
        log::trace!("event: {:?}", event);
        self.queue.push(event);
    }

    /// Take every queued event in publish order
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut bus = EventBus::new();
        bus.publish(GameEvent::GameStart);
        bus.publish(GameEvent::LivesChange(10));
        bus.publish(GameEvent::ScoreChange(0));
        assert_eq!(bus.len(), 3);
        assert_eq!(
            bus.drain(),
            vec![
                GameEvent::GameStart,
                GameEvent::LivesChange(10),
                GameEvent::ScoreChange(0)
            ]
        );
        assert!(bus.is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&GameEvent::GameOver(120)).unwrap();
        assert_eq!(json, r#"{"event":"gameOver","value":120}"#);
        let json = serde_json::to_string(&GameEvent::GameStart).unwrap();
        assert_eq!(json, r#"{"event":"gameStart"}"#);
    }
}
