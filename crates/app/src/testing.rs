//! In-memory port implementations shared by the service tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};

use roomhub_domain::device::{Device, DeviceKind, NewDevice};
use roomhub_domain::error::HubError;
use roomhub_domain::id::{DeviceId, RoomId, UserId, ValueId};
use roomhub_domain::policy::{Owned, Scope};
use roomhub_domain::room::{NewRoom, Room};
use roomhub_domain::settings::Settings;
use roomhub_domain::time::Timestamp;
use roomhub_domain::token::Token;
use roomhub_domain::user::{Identity, NewUser, User};
use roomhub_domain::value::{NewValue, Value};

use crate::ports::{
    DeviceRepository, PasswordHasher, RoomRepository, SettingsRepository, TokenRepository,
    UserRepository, ValueRepository,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    rooms: BTreeMap<RoomId, Room>,
    devices: BTreeMap<DeviceId, Device>,
    values: BTreeMap<ValueId, Value>,
    tokens: HashMap<String, Token>,
    settings: Option<Settings>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn device_owner(&self, device_id: DeviceId) -> Option<UserId> {
        let device = self.devices.get(&device_id)?;
        self.rooms.get(&device.room_id).map(|room| room.owner_id)
    }
}

/// A single store behind every repository port, so the ownership chain
/// `value → device → room → owner` resolves across them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn add_user(&self, username: &str, is_staff: bool, is_superuser: bool) -> Identity {
        let mut tables = self.tables.lock().unwrap();
        let id = UserId::new(tables.next_id());
        let user = User {
            id,
            username: username.to_string(),
            email: None,
            password_hash: format!("hashed:{username}"),
            is_staff,
            is_superuser,
        };
        let identity = Identity::from(&user);
        tables.users.insert(id, user);
        identity
    }

    pub fn device_count(&self) -> usize {
        self.tables.lock().unwrap().devices.len()
    }

    pub fn value_count(&self) -> usize {
        self.tables.lock().unwrap().values.len()
    }

    pub fn token(&self, secret: &str) -> Option<Token> {
        self.tables.lock().unwrap().tokens.get(secret).cloned()
    }
}

impl UserRepository for InMemoryStore {
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, HubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let id = UserId::new(tables.next_id());
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        };
        tables.users.insert(id, user.clone());
        async { Ok(user) }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, HubError>> + Send {
        let result = self.tables.lock().unwrap().users.get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned();
        async { Ok(result) }
    }
}

impl RoomRepository for InMemoryStore {
    fn create(&self, room: NewRoom) -> impl Future<Output = Result<Room, HubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let room = Room {
            id: RoomId::new(tables.next_id()),
            name: room.name,
            owner_id: room.owner_id,
        };
        tables.rooms.insert(room.id, room.clone());
        async { Ok(room) }
    }

    fn get_by_id(
        &self,
        id: RoomId,
    ) -> impl Future<Output = Result<Option<Room>, HubError>> + Send {
        let result = self.tables.lock().unwrap().rooms.get(&id).cloned();
        async { Ok(result) }
    }

    fn list(&self, scope: Scope) -> impl Future<Output = Result<Vec<Room>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result: Vec<Room> = tables
            .rooms
            .values()
            .filter(|room| scope.contains(room.owner_id))
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update(&self, room: Room) -> impl Future<Output = Result<Room, HubError>> + Send {
        self.tables
            .lock()
            .unwrap()
            .rooms
            .insert(room.id, room.clone());
        async { Ok(room) }
    }

    fn delete(&self, id: RoomId) -> impl Future<Output = Result<(), HubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        tables.rooms.remove(&id);
        tables.devices.retain(|_, device| device.room_id != id);
        let Tables {
            devices, values, ..
        } = &mut *tables;
        values.retain(|_, value| devices.contains_key(&value.device_id));
        async { Ok(()) }
    }
}

impl DeviceRepository for InMemoryStore {
    fn create(&self, device: NewDevice) -> impl Future<Output = Result<Device, HubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let device = device.into_device(DeviceId::new(tables.next_id()));
        tables.devices.insert(device.id, device.clone());
        async { Ok(device) }
    }

    fn get_owned(
        &self,
        kind: DeviceKind,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Owned<Device>>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .devices
            .get(&id)
            .filter(|device| device.kind == kind)
            .and_then(|device| {
                tables.device_owner(device.id).map(|owner_id| Owned {
                    item: device.clone(),
                    owner_id,
                })
            });
        async { Ok(result) }
    }

    fn list(
        &self,
        kind: DeviceKind,
        scope: Scope,
    ) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result: Vec<Device> = tables
            .devices
            .values()
            .filter(|device| device.kind == kind)
            .filter(|device| {
                tables
                    .device_owner(device.id)
                    .is_some_and(|owner| scope.contains(owner))
            })
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn list_by_room(
        &self,
        kind: DeviceKind,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result: Vec<Device> = tables
            .devices
            .values()
            .filter(|device| device.kind == kind && device.room_id == room_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        self.tables
            .lock()
            .unwrap()
            .devices
            .insert(device.id, device.clone());
        async { Ok(device) }
    }

    fn delete(
        &self,
        _kind: DeviceKind,
        id: DeviceId,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        tables.devices.remove(&id);
        tables.values.retain(|_, value| value.device_id != id);
        async { Ok(()) }
    }
}

impl ValueRepository for InMemoryStore {
    fn create(&self, value: NewValue) -> impl Future<Output = Result<Value, HubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let value = value.into_value(ValueId::new(tables.next_id()));
        tables.values.insert(value.id, value.clone());
        async { Ok(value) }
    }

    fn get_owned(
        &self,
        kind: DeviceKind,
        id: ValueId,
    ) -> impl Future<Output = Result<Option<Owned<Value>>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .values
            .get(&id)
            .filter(|value| value.kind == kind)
            .and_then(|value| {
                tables.device_owner(value.device_id).map(|owner_id| Owned {
                    item: value.clone(),
                    owner_id,
                })
            });
        async { Ok(result) }
    }

    fn list(
        &self,
        kind: DeviceKind,
        scope: Scope,
    ) -> impl Future<Output = Result<Vec<Value>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result: Vec<Value> = tables
            .values
            .values()
            .filter(|value| value.kind == kind)
            .filter(|value| {
                tables
                    .device_owner(value.device_id)
                    .is_some_and(|owner| scope.contains(owner))
            })
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn latest_for_device(
        &self,
        kind: DeviceKind,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<Value>, HubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .values
            .values()
            .rev()
            .find(|value| value.kind == kind && value.device_id == device_id)
            .cloned();
        async { Ok(result) }
    }

    fn update(&self, value: Value) -> impl Future<Output = Result<Value, HubError>> + Send {
        self.tables
            .lock()
            .unwrap()
            .values
            .insert(value.id, value.clone());
        async { Ok(value) }
    }

    fn delete(
        &self,
        _kind: DeviceKind,
        id: ValueId,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        self.tables.lock().unwrap().values.remove(&id);
        async { Ok(()) }
    }
}

impl TokenRepository for InMemoryStore {
    fn store(&self, token: Token) -> impl Future<Output = Result<Token, HubError>> + Send {
        self.tables
            .lock()
            .unwrap()
            .tokens
            .insert(token.secret.clone(), token.clone());
        async { Ok(token) }
    }

    fn find(&self, secret: &str) -> impl Future<Output = Result<Option<Token>, HubError>> + Send {
        let result = self.tables.lock().unwrap().tokens.get(secret).cloned();
        async { Ok(result) }
    }

    fn revoke(&self, secret: &str) -> impl Future<Output = Result<(), HubError>> + Send {
        if let Some(token) = self.tables.lock().unwrap().tokens.get_mut(secret) {
            token.revoked = true;
        }
        async { Ok(()) }
    }

    fn purge_expired(&self, at: Timestamp) -> impl Future<Output = Result<u64, HubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.tokens.len();
        tables
            .tokens
            .retain(|_, token| !token.revoked && token.expires_at >= at);
        let purged = (before - tables.tokens.len()) as u64;
        async move { Ok(purged) }
    }
}

impl SettingsRepository for InMemoryStore {
    fn get(&self) -> impl Future<Output = Result<Option<Settings>, HubError>> + Send {
        let result = self.tables.lock().unwrap().settings.clone();
        async { Ok(result) }
    }

    fn put(&self, settings: Settings) -> impl Future<Output = Result<Settings, HubError>> + Send {
        self.tables.lock().unwrap().settings = Some(settings.clone());
        async { Ok(settings) }
    }
}

/// Reversible "hash" so tests stay fast.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, HubError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HubError> {
        Ok(hash.strip_prefix("hashed:") == Some(password))
    }
}
