// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Carpool board: the offers open to join requests and the requests
//! themselves.

use crate::error::CoreError;
use crate::objects::{CarpoolOffer, CarpoolParticipant, CarpoolStatus, ParticipantStatus, UserId};
use crate::store::DataStore;
use crate::Result;
use std::convert::TryFrom;
use tracing::info;

/// An offer with the requests made on it
#[derive(Debug, Clone, PartialEq)]
pub struct CarpoolListing {
    /// The offer
    pub offer: CarpoolOffer,
    /// Every join request, whatever its status
    pub participants: Vec<CarpoolParticipant>,
}

impl CarpoolListing {
    /// Seats not requested yet
    pub fn seats_left(&self) -> u32 {
        let requested = u32::try_from(self.participants.len()).unwrap_or(u32::MAX);
        self.offer.available_seats.saturating_sub(requested)
    }

    /// Has the user already asked to join
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }
}

/// The active offers with their join requests
pub fn active_listings<S: DataStore>(store: &S) -> Result<Vec<CarpoolListing>> {
    store
        .carpools(CarpoolStatus::Active)?
        .into_iter()
        .map(|offer| {
            let participants = store.participants(&offer.id)?;
            Ok(CarpoolListing {
                offer,
                participants,
            })
        })
        .collect()
}

/// Ask to join an active carpool on behalf of the current user. The request
/// is pending until the driver accepts it.
pub fn join_carpool<S: DataStore>(
    store: &mut S,
    current_user: Option<&UserId>,
    carpool_id: &str,
) -> Result<CarpoolParticipant> {
    let user_id = current_user.ok_or(CoreError::AuthenticationRequired)?;
    let listing = active_listings(store)?
        .into_iter()
        .find(|listing| listing.offer.id == carpool_id)
        .ok_or_else(|| CoreError::UnknownCarpool(carpool_id.to_string()))?;
    if listing.has_participant(user_id) {
        return Err(CoreError::AlreadyRequested {
            carpool_id: carpool_id.to_string(),
            user_id: user_id.clone(),
        }
        .into());
    }
    let participant = CarpoolParticipant {
        carpool_id: carpool_id.to_string(),
        user_id: user_id.clone(),
        status: ParticipantStatus::Pending,
    };
    store.insert_participant(participant.clone())?;
    info!("User {:?} requested to join carpool {:?}", user_id, carpool_id);
    Ok(participant)
}
