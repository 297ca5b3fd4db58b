//! Chat rooms.
//!
//! A [`MessageRoom`] is a member list with per-member mutes. Broadcasts from
//! the game reach every member; chat from a member is fanned out to every
//! member only if the sender is not muted.

use std::collections::HashSet;

use crate::game::{Player, PlayerId};
use crate::host::{Color, Host};

#[derive(Debug, Clone, Default)]
pub struct MessageRoom {
    members: Vec<Player>,
    muted: HashSet<PlayerId>,
}

impl MessageRoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `player` unless already a member.
    pub fn add(&mut self, player: Player) {
        if !self.contains(player.id) {
            self.members.push(player);
        }
    }

    pub fn remove(&mut self, id: PlayerId) {
        self.members.retain(|p| p.id != id);
        self.muted.remove(&id);
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.muted.clear();
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.members.iter().any(|p| p.id == id)
    }

    pub fn members(&self) -> &[Player] {
        &self.members
    }

    pub fn is_muted(&self, id: PlayerId) -> bool {
        self.muted.contains(&id)
    }

    pub fn mute(&mut self, id: PlayerId) {
        if self.contains(id) {
            self.muted.insert(id);
        }
    }

    pub fn unmute(&mut self, id: PlayerId) {
        self.muted.remove(&id);
    }

    pub fn mute_all(&mut self) {
        self.muted = self.members.iter().map(|p| p.id).collect();
    }

    pub fn unmute_all(&mut self) {
        self.muted.clear();
    }

    /// Sends `text` to every member.
    pub fn broadcast<H: Host + ?Sized>(&self, host: &mut H, text: &str, color: Option<Color>) {
        for member in &self.members {
            host.send(member, text, color);
        }
    }

    /// Relays chat from `from` to every member. Returns false, delivering
    /// nothing, if the sender is not a member or is muted.
    pub fn receive<H: Host + ?Sized>(
        &self,
        host: &mut H,
        from: PlayerId,
        text: &str,
        color: Option<Color>,
    ) -> bool {
        if !self.contains(from) || self.is_muted(from) {
            return false;
        }
        self.broadcast(host, text, color);
        true
    }
}
