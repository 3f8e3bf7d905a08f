//! Room lifecycle, delegated entirely to the media server.

use tracing::info;

use crate::client::types::{CreateRoomRequest, ListRoomsRequest, Room};
use crate::client::MediaClient;
use crate::Result;

#[derive(Debug, Clone)]
pub struct RoomService {
    client: MediaClient,
}

impl RoomService {
    #[must_use]
    pub fn new(client: MediaClient) -> Self {
        Self { client }
    }

    /// Create a room. `max_participants` 0 means unlimited, `empty_timeout`
    /// 0 means the room never closes on its own.
    pub async fn create_room(
        &self,
        name: &str,
        max_participants: u32,
        empty_timeout: u32,
    ) -> Result<Room> {
        info!(room = name, max_participants, empty_timeout, "creating room");
        let room = self
            .client
            .create_room(&CreateRoomRequest {
                name: name.to_string(),
                max_participants,
                empty_timeout,
            })
            .await?;
        info!(room = name, sid = %room.sid, "room created");
        Ok(room)
    }

    pub async fn list_rooms(&self, names: Vec<String>) -> Result<Vec<Room>> {
        Ok(self.client.list_rooms(&ListRoomsRequest { names }).await?)
    }

    /// Room by name, `None` when it does not exist
    pub async fn get_room(&self, name: &str) -> Result<Option<Room>> {
        let rooms = self.list_rooms(vec![name.to_string()]).await?;
        Ok(rooms.into_iter().find(|r| r.name == name))
    }

    pub async fn room_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_room(name).await?.is_some())
    }

    /// Delete a room and disconnect every participant in it
    pub async fn delete_room(&self, name: &str) -> Result<()> {
        info!(room = name, "deleting room");
        self.client.delete_room(name).await?;
        Ok(())
    }
}
