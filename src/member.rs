use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::account::{MemberId, UserId};

/// Account holder as known to the member registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Platform user logged in as this member, if any.
    pub linked_user: Option<UserId>,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            linked_user: None,
        }
    }

    pub fn with_user(mut self, user: UserId) -> Self {
        self.linked_user = Some(user);
        self
    }
}

pub trait MemberRegistry: Send + Sync {
    fn contains(&self, member: MemberId) -> bool;

    fn linked_user(&self, member: MemberId) -> Option<UserId>;
}

#[derive(Debug, Default)]
pub struct InMemoryMemberRegistry {
    members: RwLock<HashMap<MemberId, Member>>,
}

impl InMemoryMemberRegistry {
    /// Inserts or replaces the member with the same id.
    pub fn register(&self, member: Member) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(member.id, member);
    }

    pub fn get(&self, member: MemberId) -> Option<Member> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&member)
            .cloned()
    }
}

impl MemberRegistry for InMemoryMemberRegistry {
    fn contains(&self, member: MemberId) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&member)
    }

    fn linked_user(&self, member: MemberId) -> Option<UserId> {
        self.get(member).and_then(|m| m.linked_user)
    }
}
