use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{ChatId, DomainError, DomainResult, Entity, MessageId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Conversation between exactly two distinct users.
///
/// Participants are kept sorted so a pair maps to one chat regardless of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    participants: [UserId; 2],
    #[serde(default)]
    messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn open(a: UserId, b: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        if a == b {
            return Err(DomainError::validation("a chat needs two distinct participants"));
        }
        Ok(Self {
            id: ChatId::new(),
            participants: Self::pair_key(a, b),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Order-independent key for a participant pair.
    pub fn pair_key(a: UserId, b: UserId) -> [UserId; 2] {
        if a <= b { [a, b] } else { [b, a] }
    }

    pub fn participants(&self) -> &[UserId; 2] {
        &self.participants
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }

    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        self.participants == Self::pair_key(a, b)
    }

    /// The participant who is not `user_id`.
    pub fn counterpart(&self, user_id: UserId) -> Option<UserId> {
        match self.participants {
            [x, y] if x == user_id => Some(y),
            [x, y] if y == user_id => Some(x),
            _ => None,
        }
    }

    pub fn append(&mut self, sender_id: UserId, content: &str, now: DateTime<Utc>) -> DomainResult<Message> {
        if !self.has_participant(sender_id) {
            return Err(DomainError::forbidden(format!("user {sender_id} is not in chat {}", self.id)));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("message content cannot be empty"));
        }

        let message = Message {
            id: MessageId::new(),
            sender_id,
            content: content.to_string(),
            timestamp: now,
        };
        self.messages.push(message.clone());
        self.updated_at = now;
        Ok(message)
    }
}

impl Entity for Chat {
    type Id = ChatId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_unordered() {
        let (a, b) = (UserId::new(), UserId::new());
        let chat = Chat::open(b, a, Utc::now()).unwrap();
        assert!(chat.is_between(a, b));
        assert!(chat.is_between(b, a));
        assert_eq!(chat.counterpart(a), Some(b));
        assert_eq!(chat.counterpart(UserId::new()), None);
    }

    #[test]
    fn self_chat_is_rejected() {
        let a = UserId::new();
        assert!(matches!(Chat::open(a, a, Utc::now()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn only_participants_may_send() {
        let (a, b) = (UserId::new(), UserId::new());
        let mut chat = Chat::open(a, b, Utc::now()).unwrap();

        assert!(matches!(chat.append(UserId::new(), "hi", Utc::now()), Err(DomainError::Forbidden(_))));
        assert!(matches!(chat.append(a, "   ", Utc::now()), Err(DomainError::Validation(_))));

        chat.append(a, " hello ", Utc::now()).unwrap();
        chat.append(b, "hey", Utc::now()).unwrap();
        let contents: Vec<_> = chat.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "hey"]);
        assert_eq!(chat.last_message().map(|m| m.sender_id), Some(b));
    }

    #[test]
    fn json_shape() {
        let chat = Chat::open(UserId::new(), UserId::new(), Utc::now()).unwrap();
        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["participants"].as_array().map(Vec::len), Some(2));
        assert!(json["messages"].as_array().unwrap().is_empty());
    }
}
