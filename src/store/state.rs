//! In-memory working set backed by the document store.
//!
//! All reads and writes go through this mirror; persistence is asynchronous
//! and fire-and-forget, so a slow or briefly unavailable store never blocks
//! a request. Writes are last-write-wins at document granularity.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AppNotification, Assignment, Branch, LeaveRequest, Regulation, Role, ScheduleLog, ShiftConfig,
    ShiftRecord, User, UserStatus,
};
use crate::store::{Collection, RemoteStore};

const SEED_PASSWORD: &str = "123";

pub struct AppData {
    store: Option<Arc<dyn RemoteStore>>,
    pub branches: RwLock<Vec<Branch>>,
    pub users: RwLock<Vec<User>>,
    pub records: RwLock<Vec<ShiftRecord>>,
    pub leave_requests: RwLock<Vec<LeaveRequest>>,
    // Memory-only collections, reseeded on restart.
    pub assignments: RwLock<Vec<Assignment>>,
    pub schedule_logs: RwLock<Vec<ScheduleLog>>,
    pub notifications: RwLock<Vec<AppNotification>>,
    pub regulations: RwLock<Vec<Regulation>>,
}

impl AppData {
    /// Load the working set from the store. A non-empty remote collection
    /// wins over the seed; an empty one is seeded and the seed is pushed
    /// back so the next boot finds it.
    pub async fn load(store: Arc<dyn RemoteStore>) -> Result<Self> {
        let branches =
            load_or_seed(store.as_ref(), Collection::Branches, seed_branches(), |b| {
                b.id.clone()
            })
            .await?;
        let users = load_or_seed(store.as_ref(), Collection::Users, seed_users()?, |u| {
            u.id.clone()
        })
        .await?;
        let records = load_or_seed(
            store.as_ref(),
            Collection::ShiftRecords,
            Vec::<ShiftRecord>::new(),
            |r| r.id.clone(),
        )
        .await?;
        let leave_requests = load_or_seed(
            store.as_ref(),
            Collection::LeaveRequests,
            Vec::<LeaveRequest>::new(),
            |r| r.id.clone(),
        )
        .await?;

        Ok(AppData {
            store: Some(store),
            branches: RwLock::new(branches),
            users: RwLock::new(users),
            records: RwLock::new(records),
            leave_requests: RwLock::new(leave_requests),
            assignments: RwLock::new(seed_assignments(Utc::now().date_naive())),
            schedule_logs: RwLock::new(Vec::new()),
            notifications: RwLock::new(seed_notifications()),
            regulations: RwLock::new(seed_regulations()),
        })
    }

    /// Seeded working set with no store behind it. Used by tests; every
    /// sync call becomes a no-op.
    pub fn detached() -> Result<Self> {
        Ok(AppData {
            store: None,
            branches: RwLock::new(seed_branches()),
            users: RwLock::new(seed_users()?),
            records: RwLock::new(Vec::new()),
            leave_requests: RwLock::new(Vec::new()),
            assignments: RwLock::new(seed_assignments(Utc::now().date_naive())),
            schedule_logs: RwLock::new(Vec::new()),
            notifications: RwLock::new(seed_notifications()),
            regulations: RwLock::new(seed_regulations()),
        })
    }

    /// Replace the record with the same id in place, or prepend it so the
    /// newest record lists first. Persists asynchronously.
    pub async fn upsert_record(&self, record: ShiftRecord) {
        {
            let mut records = self.records.write().await;
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(slot) => *slot = record.clone(),
                None => records.insert(0, record.clone()),
            }
        }
        self.sync(Collection::ShiftRecords, &record.id, &record);
    }

    pub async fn upsert_user(&self, user: User) {
        {
            let mut users = self.users.write().await;
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(slot) => *slot = user.clone(),
                None => users.push(user.clone()),
            }
        }
        self.sync(Collection::Users, &user.id, &user);
    }

    pub async fn upsert_branch(&self, branch: Branch) {
        {
            let mut branches = self.branches.write().await;
            match branches.iter_mut().find(|b| b.id == branch.id) {
                Some(slot) => *slot = branch.clone(),
                None => branches.push(branch.clone()),
            }
        }
        self.sync(Collection::Branches, &branch.id, &branch);
    }

    pub async fn upsert_leave_request(&self, request: LeaveRequest) {
        {
            let mut requests = self.leave_requests.write().await;
            match requests.iter_mut().find(|r| r.id == request.id) {
                Some(slot) => *slot = request.clone(),
                None => requests.insert(0, request.clone()),
            }
        }
        self.sync(Collection::LeaveRequests, &request.id, &request);
    }

    pub async fn remove_leave_request(&self, id: &str) {
        {
            let mut requests = self.leave_requests.write().await;
            requests.retain(|r| r.id != id);
        }
        if let Some(store) = &self.store {
            let store = Arc::clone(store);
            let id = id.to_string();
            tokio::spawn(async move {
                if let Err(err) = store.delete(Collection::LeaveRequests, &id).await {
                    log::error!("Failed to delete leave request {}: {}", id, err);
                }
            });
        }
    }

    /// Fire-and-forget persistence of a single document.
    fn sync<T: Serialize>(&self, collection: Collection, id: &str, document: &T) {
        let Some(store) = &self.store else {
            return;
        };
        let value = match serde_json::to_value(document) {
            Ok(value) => value,
            Err(err) => {
                log::error!("Failed to serialize document {}: {}", id, err);
                return;
            }
        };
        let store = Arc::clone(store);
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(err) = store.upsert_many(collection, &[(id.clone(), value)]).await {
                log::error!("Failed to persist document {}: {}", id, err);
            }
        });
    }
}

/// Remote wins only when it actually has documents. Malformed documents are
/// skipped with a warning rather than failing the boot.
async fn load_or_seed<T, F>(
    store: &dyn RemoteStore,
    collection: Collection,
    seed: Vec<T>,
    id_of: F,
) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> String,
{
    let documents = store.fetch_all(collection).await?;
    if !documents.is_empty() {
        let mut items = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value(document) {
                Ok(item) => items.push(item),
                Err(err) => log::warn!("Skipping malformed document in {:?}: {}", collection, err),
            }
        }
        return Ok(items);
    }

    let items = seed;
    if !items.is_empty() {
        let docs = items
            .iter()
            .map(|item| Ok((id_of(item), serde_json::to_value(item)?)))
            .collect::<Result<Vec<_>>>()?;
        store.upsert_many(collection, &docs).await?;
    }
    Ok(items)
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn shift(name: &str, start: NaiveTime, end: NaiveTime) -> ShiftConfig {
    ShiftConfig {
        name: name.to_string(),
        start,
        end,
    }
}

pub fn seed_branches() -> Vec<Branch> {
    let mut district_1 = BTreeMap::new();
    district_1.insert("SHIFT_1".to_string(), shift("Ca 1", hm(8, 0), hm(12, 0)));
    district_1.insert("SHIFT_2".to_string(), shift("Ca 2", hm(12, 0), hm(17, 0)));
    district_1.insert("SHIFT_3".to_string(), shift("Ca 3", hm(17, 0), hm(22, 0)));

    let mut district_7 = BTreeMap::new();
    district_7.insert("SHIFT_1".to_string(), shift("Ca Sáng", hm(7, 30), hm(11, 30)));
    district_7.insert("SHIFT_2".to_string(), shift("Ca Chiều", hm(11, 30), hm(16, 30)));
    district_7.insert("SHIFT_3".to_string(), shift("Ca Tối", hm(16, 30), hm(21, 30)));

    vec![
        Branch {
            id: "1".to_string(),
            name: "Chi nhánh Quận 1".to_string(),
            lat: 10.7769,
            lng: 106.7009,
            radius: 100.0,
            address: Some("72 Lê Thánh Tôn, Quận 1".to_string()),
            shifts: district_1,
            is_active: true,
        },
        Branch {
            id: "2".to_string(),
            name: "Chi nhánh Quận 7".to_string(),
            lat: 10.7289,
            lng: 106.7082,
            radius: 150.0,
            address: Some("101 Tôn Dật Tiên, Quận 7".to_string()),
            shifts: district_7,
            is_active: true,
        },
    ]
}

pub fn seed_users() -> Result<Vec<User>> {
    let password_hash = bcrypt::hash(SEED_PASSWORD, bcrypt::DEFAULT_COST)?;
    let user = |id: &str, username: &str, name: &str, email: &str, role, branch_id: Option<&str>, avatar_seed: &str| User {
        id: id.to_string(),
        username: username.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password_hash.clone(),
        is_first_login: false,
        role,
        avatar: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={avatar_seed}"),
        status: UserStatus::Working,
        branch_id: branch_id.map(str::to_string),
        notes: None,
        confirmed_regulations: Vec::new(),
    };
    Ok(vec![
        user("admin_1", "admin", "Hệ thống Admin", "admin@lapoza.com", Role::Admin, None, "Admin"),
        user("manager_1", "quanly", "Quản lý Chi nhánh", "manager@lapoza.com", Role::Manager, Some("1"), "Manager"),
        user("staff_1", "nv1", "Nhân viên 1", "nv1@lapoza.com", Role::Staff, Some("1"), "Staff1"),
    ])
}

fn seed_assignments(today: NaiveDate) -> Vec<Assignment> {
    let assignment = |user_id: &str| Assignment {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        date: today,
        shift_type: "SHIFT_1".to_string(),
        updated_at: Utc::now(),
        updated_by: "Admin".to_string(),
    };
    vec![assignment("staff_1"), assignment("manager_1")]
}

fn seed_notifications() -> Vec<AppNotification> {
    vec![AppNotification {
        id: "n1".to_string(),
        title: "Chào mừng Lapoza v1.0".to_string(),
        content: "Hệ thống quản lý Lapoza chính thức đi vào hoạt động. Vui lòng kiểm tra lịch trực thường xuyên.".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap_or_default(),
        author_name: "Admin".to_string(),
        branch_id: None,
    }]
}

fn seed_regulations() -> Vec<Regulation> {
    vec![Regulation {
        id: "r1".to_string(),
        title: "Nội quy chấm công".to_string(),
        content: "1. Nhân viên phải có mặt trước 5 phút để chuẩn bị.\n2. Phải chụp ảnh rõ mặt khi điểm danh.\n3. Vị trí điểm danh phải nằm trong bán kính cho phép của chi nhánh.".to_string(),
        updated_at: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::RecordStatus;
    use crate::store::SqliteStore;
    use sqlx::sqlite::SqlitePool;

    async fn memory_store() -> Arc<dyn RemoteStore> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        Arc::new(SqliteStore::new(pool))
    }

    fn record(id: &str) -> ShiftRecord {
        ShiftRecord {
            id: id.to_string(),
            user_id: "staff_1".to_string(),
            user_name: None,
            user_avatar: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            shift_type: "SHIFT_1".to_string(),
            check_in_time: None,
            check_out_time: None,
            check_in_photo: None,
            check_out_photo: None,
            check_in_status: None,
            check_out_status: None,
            status: RecordStatus::Pending,
            closing_data: None,
            adjusted_closing_data: None,
            is_confirmed: false,
            confirmed_by: None,
            confirmed_at: None,
            manager_comment: None,
            audit_log: Vec::new(),
            branch_id: Some("1".to_string()),
        }
    }

    #[actix_rt::test]
    async fn empty_store_is_seeded() {
        let store = memory_store().await;
        let data = AppData::load(Arc::clone(&store)).await.unwrap();

        assert_eq!(data.branches.read().await.len(), 2);
        assert_eq!(data.users.read().await.len(), 3);
        assert!(data.records.read().await.is_empty());

        // The seed was pushed back to the store.
        assert_eq!(store.fetch_all(Collection::Branches).await.unwrap().len(), 2);
        assert_eq!(store.fetch_all(Collection::Users).await.unwrap().len(), 3);
    }

    #[actix_rt::test]
    async fn non_empty_store_wins_over_seed() {
        let store = memory_store().await;
        let branch = Branch {
            name: "Chi nhánh Thủ Đức".to_string(),
            ..seed_branches().remove(0)
        };
        store
            .upsert_many(
                Collection::Branches,
                &[(
                    branch.id.clone(),
                    serde_json::to_value(&branch).unwrap(),
                )],
            )
            .await
            .unwrap();

        let data = AppData::load(store).await.unwrap();
        let branches = data.branches.read().await;
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name, "Chi nhánh Thủ Đức");
    }

    #[actix_rt::test]
    async fn upsert_record_replaces_in_place_or_prepends() {
        let data = AppData::detached().unwrap();
        data.upsert_record(record("a")).await;
        data.upsert_record(record("b")).await;
        {
            let records = data.records.read().await;
            assert_eq!(records[0].id, "b");
            assert_eq!(records[1].id, "a");
        }

        let mut updated = record("a");
        updated.status = RecordStatus::Completed;
        data.upsert_record(updated).await;
        let records = data.records.read().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status, RecordStatus::Completed);
    }

    #[actix_rt::test]
    async fn seed_password_verifies() {
        let users = seed_users().unwrap();
        assert!(bcrypt::verify("123", &users[0].password_hash).unwrap());
    }
}
