//! Order batching.
//!
//! Accumulates troop and city orders between exchanges and turns them into
//! a single `ClientMsg` per round.

use dominion_shared::{
    math::Vec2,
    net::{CityId, CityOrder, ClientMsg, TroopId, TroopOrder},
};

/// Pending orders for the next exchange.
#[derive(Debug, Clone, Default)]
pub struct OrderBuffer {
    troops: Vec<TroopOrder>,
    cities: Vec<CityOrder>,
}

impl OrderBuffer {
    pub fn move_troop(&mut self, troop: TroopId, path: Vec<Vec2>) {
        self.troops.push(TroopOrder { troop, path });
    }

    pub fn rally_city(&mut self, city: CityId, path: Vec<Vec2>) {
        self.cities.push(CityOrder { city, path });
    }

    pub fn is_empty(&self) -> bool {
        self.troops.is_empty() && self.cities.is_empty()
    }

    /// Drains the buffer into the message for one exchange.
    pub fn take_msg(&mut self) -> ClientMsg {
        ClientMsg::Commands {
            troops: std::mem::take(&mut self.troops),
            cities: std::mem::take(&mut self.cities),
        }
    }
}
