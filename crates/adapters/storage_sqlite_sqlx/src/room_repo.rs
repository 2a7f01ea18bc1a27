//! `SQLite` implementation of [`RoomRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use roomhub_app::ports::RoomRepository;
use roomhub_domain::error::HubError;
use roomhub_domain::id::{RoomId, UserId};
use roomhub_domain::policy::Scope;
use roomhub_domain::room::{NewRoom, Room};

use crate::error::StorageError;
use crate::owner_filter;

/// Wrapper for converting database rows into domain [`Room`].
struct Wrapper(Room);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Room> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Room {
            id: RoomId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            owner_id: UserId::new(row.try_get("owner_id")?),
        }))
    }
}

const INSERT: &str = "INSERT INTO rooms (name, owner_id) VALUES (?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM rooms WHERE id = ?";
const SELECT_SCOPED: &str = "SELECT * FROM rooms WHERE (?1 IS NULL OR owner_id = ?1) ORDER BY id";
const UPDATE: &str = "UPDATE rooms SET name = ?, owner_id = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM rooms WHERE id = ?";

/// `SQLite`-backed room repository.
pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RoomRepository for SqliteRoomRepository {
    fn create(&self, room: NewRoom) -> impl Future<Output = Result<Room, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(&room.name)
                .bind(room.owner_id.as_i64())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Room {
                id: RoomId::new(result.last_insert_rowid()),
                name: room.name,
                owner_id: room.owner_id,
            })
        }
    }

    fn get_by_id(
        &self,
        id: RoomId,
    ) -> impl Future<Output = Result<Option<Room>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn list(&self, scope: Scope) -> impl Future<Output = Result<Vec<Room>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_SCOPED)
                .bind(owner_filter(scope))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, room: Room) -> impl Future<Output = Result<Room, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&room.name)
                .bind(room.owner_id.as_i64())
                .bind(room.id.as_i64())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(room)
        }
    }

    fn delete(&self, id: RoomId) -> impl Future<Output = Result<(), HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.as_i64())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, setup};

    #[tokio::test]
    async fn should_create_and_retrieve_room() {
        let Fixture { pool, alice, .. } = setup().await;
        let repo = SqliteRoomRepository::new(pool);

        let room = repo
            .create(NewRoom {
                name: "Kitchen".to_string(),
                owner_id: alice,
            })
            .await
            .unwrap();

        let fetched = repo.get_by_id(room.id).await.unwrap().unwrap();
        assert_eq!(fetched, room);
    }

    #[tokio::test]
    async fn should_return_none_when_room_not_found() {
        let Fixture { pool, .. } = setup().await;
        let repo = SqliteRoomRepository::new(pool);
        assert!(repo.get_by_id(RoomId::new(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_filter_rooms_by_owner_scope() {
        let Fixture { pool, alice, bob } = setup().await;
        let repo = SqliteRoomRepository::new(pool);
        for (name, owner_id) in [("Kitchen", alice), ("Garage", bob), ("Attic", alice)] {
            repo.create(NewRoom {
                name: name.to_string(),
                owner_id,
            })
            .await
            .unwrap();
        }

        let mine = repo.list(Scope::OwnedBy(alice)).await.unwrap();
        let names: Vec<&str> = mine.iter().map(|room| room.name.as_str()).collect();
        assert_eq!(names, vec!["Kitchen", "Attic"]);

        assert_eq!(repo.list(Scope::All).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn should_update_room_name_and_owner() {
        let Fixture { pool, alice, bob } = setup().await;
        let repo = SqliteRoomRepository::new(pool);
        let mut room = repo
            .create(NewRoom {
                name: "Kitchen".to_string(),
                owner_id: alice,
            })
            .await
            .unwrap();

        room.name = "Pantry".to_string();
        room.owner_id = bob;
        repo.update(room.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(room.id).await.unwrap().unwrap(), room);
    }

    #[tokio::test]
    async fn should_delete_room() {
        let Fixture { pool, alice, .. } = setup().await;
        let repo = SqliteRoomRepository::new(pool);
        let room = repo
            .create(NewRoom {
                name: "Kitchen".to_string(),
                owner_id: alice,
            })
            .await
            .unwrap();

        repo.delete(room.id).await.unwrap();
        assert!(repo.get_by_id(room.id).await.unwrap().is_none());
    }
}
