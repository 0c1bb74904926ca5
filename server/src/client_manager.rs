//! Connection tracking, team assignment and slot registry for the server
//!
//! This module owns every live connection and decides where each one plays:
//! - Team assignment alternates red/blue for the lifetime of the process
//! - Slots are dense positions 1..N rebuilt from scratch on every membership change
//! - Connections whose transport has closed are dropped before slots are handed out
//!
//! Slot order follows connection order, so the earliest surviving connection
//! always holds slot 1 and the newest one holds slot N.

use log::{debug, info};
use shared::Team;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Outbound half of a connection: already-serialized JSON text frames.
pub type Outbound = mpsc::UnboundedSender<String>;

/// A connected player
///
/// The team is fixed at connect time. The slot is rewritten by every
/// [`ClientManager::recompute_slots`] call; 0 means not yet assigned.
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Peer address, used to route transport events back to this client
    pub addr: SocketAddr,
    pub team: Team,
    pub slot: u32,
    outbound: Outbound,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, team: Team, outbound: Outbound) -> Self {
        Self {
            id,
            addr,
            team,
            slot: 0,
            outbound,
        }
    }

    /// True while the writer task for this connection is still draining messages.
    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }

    /// Queues a text frame. Returns false if the transport is already gone.
    pub fn send(&self, text: String) -> bool {
        self.outbound.send(text).is_ok()
    }
}

/// Hands out teams in strict red, blue, red, ... order.
///
/// Disconnects do not rewind the sequence.
#[derive(Debug)]
pub struct TeamAssigner {
    next: Team,
}

impl Default for TeamAssigner {
    fn default() -> Self {
        Self { next: Team::Red }
    }
}

impl TeamAssigner {
    pub fn assign(&mut self) -> Team {
        let team = self.next;
        self.next = team.other();
        team
    }
}

/// Registry of live connections and their slot positions
pub struct ClientManager {
    /// Connected clients keyed by id; ids only grow, so this is connection order
    clients: BTreeMap<u32, Client>,
    next_client_id: u32,
    teams: TeamAssigner,
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientManager {
    pub fn new() -> Self {
        Self {
            clients: BTreeMap::new(),
            next_client_id: 1,
            teams: TeamAssigner::default(),
        }
    }

    /// Registers a new connection and gives it the next team.
    ///
    /// The client starts without a slot; call [`recompute_slots`](Self::recompute_slots)
    /// afterwards to place it.
    pub fn add_client(&mut self, addr: SocketAddr, outbound: Outbound) -> u32 {
        let client_id = self.next_client_id;
        self.next_client_id += 1;

        let team = self.teams.assign();
        info!("Client {} connected from {} on team {:?}", client_id, addr, team);
        self.clients
            .insert(client_id, Client::new(client_id, addr, team, outbound));

        client_id
    }

    pub fn remove_client(&mut self, client_id: &u32) -> Option<Client> {
        let removed = self.clients.remove(client_id);
        if let Some(client) = &removed {
            info!(
                "Client {} disconnected (slot {}, team {:?})",
                client.id, client.slot, client.team
            );
        }
        removed
    }

    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .values()
            .find(|client| client.addr == addr)
            .map(|client| client.id)
    }

    pub fn get(&self, client_id: u32) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    /// Current slot of a client, or None if it is unknown or not yet placed.
    pub fn slot_of(&self, client_id: u32) -> Option<u32> {
        self.clients
            .get(&client_id)
            .map(|client| client.slot)
            .filter(|slot| *slot > 0)
    }

    /// Removes every connection whose transport has closed and hands them back,
    /// still carrying the slot they held.
    pub fn remove_closed(&mut self) -> Vec<Client> {
        let closed: Vec<u32> = self
            .clients
            .values()
            .filter(|client| !client.is_open())
            .map(|client| client.id)
            .collect();
        closed
            .iter()
            .filter_map(|client_id| self.remove_client(client_id))
            .collect()
    }

    /// Rebuilds the slot assignment from scratch.
    ///
    /// Connections with a closed transport are removed first, then the
    /// survivors are numbered 1..N in connection order. Returns N.
    pub fn recompute_slots(&mut self) -> u32 {
        let closed = self.remove_closed();

        let mut total = 0;
        for client in self.clients.values_mut() {
            total += 1;
            client.slot = total;
        }

        debug!(
            "Recomputed slots: {} active, {} stale dropped",
            total,
            closed.len()
        );
        total
    }

    /// Team of whichever connection currently occupies `slot`.
    pub fn team_for_slot(&self, slot: u32) -> Option<Team> {
        self.clients
            .values()
            .find(|client| client.slot == slot && slot > 0)
            .map(|client| client.team)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Sends the same frame to every open connection.
    ///
    /// Returns the ids whose send failed; they are cleaned up on the next recompute.
    pub fn broadcast(&self, text: &str) -> Vec<u32> {
        self.clients
            .values()
            .filter(|client| client.is_open())
            .filter(|client| !client.send(text.to_string()))
            .map(|client| client.id)
            .collect()
    }

    pub fn send_to(&self, client_id: u32, text: String) -> bool {
        self.clients
            .get(&client_id)
            .map(|client| client.send(text))
            .unwrap_or(false)
    }

    /// Number of registered connections whose transport is still open
    pub fn active_count(&self) -> usize {
        self.clients.values().filter(|client| client.is_open()).count()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
