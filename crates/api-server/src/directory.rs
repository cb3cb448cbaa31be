//! Account, patient and employee records.
//!
//! Handlers only see the [`Directory`] trait; [`InMemoryDirectory`] is the
//! process-local implementation used by the server and the tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::password::PasswordHash;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Employee,
}

impl Role {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "patient" => Some(Role::Patient),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: PasswordHash,
    pub role: Role,
}

/// Public view of an account (no credentials)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Patient {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub diagnosis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub department: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("User with this email already exists.")]
    EmailTaken,
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user(&self, id: u64) -> Option<User>;

    async fn find_user_by_email(&self, email: &str) -> Option<User>;

    /// Create an account, hashing its password. Emails are unique.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, DirectoryError>;

    async fn list_patients(&self) -> Vec<Patient>;

    async fn list_employees(&self) -> Vec<Employee>;
}

#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<Vec<User>>,
    patients: RwLock<Vec<Patient>>,
    employees: RwLock<Vec<Employee>>,
}

pub const DEMO_PASSWORD: &str = "password123";
pub const DEMO_PATIENT_EMAIL: &str = "patient@example.com";
pub const DEMO_EMPLOYEE_EMAIL: &str = "employee@example.com";

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with the demo accounts and sample records.
    pub fn with_demo_data() -> Self {
        let users = vec![
            User {
                id: 1,
                name: "John Doe".to_string(),
                email: DEMO_PATIENT_EMAIL.to_string(),
                password: PasswordHash::new(DEMO_PASSWORD),
                role: Role::Patient,
            },
            User {
                id: 2,
                name: "Dr. Smith".to_string(),
                email: DEMO_EMPLOYEE_EMAIL.to_string(),
                password: PasswordHash::new(DEMO_PASSWORD),
                role: Role::Employee,
            },
        ];

        let patients = vec![
            patient(1, "John Doe", 45, "Low Risk"),
            patient(2, "Jane Smith", 52, "High Risk"),
            patient(3, "Bob Johnson", 38, "Low Risk"),
        ];

        let employees = vec![
            employee(1, "Dr. Smith", "Cardiology"),
            employee(2, "Dr. Williams", "Internal Medicine"),
            employee(3, "Nurse Sarah", "Emergency"),
        ];

        Self {
            users: RwLock::new(users),
            patients: RwLock::new(patients),
            employees: RwLock::new(employees),
        }
    }
}

fn patient(id: u64, name: &str, age: u32, diagnosis: &str) -> Patient {
    Patient {
        id,
        name: name.to_string(),
        age,
        diagnosis: diagnosis.to_string(),
    }
}

fn employee(id: u64, name: &str, department: &str) -> Employee {
    Employee {
        id,
        name: name.to_string(),
        department: department.to_string(),
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_user(&self, id: u64) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        // Hold the write lock across the uniqueness check and the push
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DirectoryError::EmailTaken);
        }

        let user = User {
            id: users.len() as u64 + 1,
            name: new_user.name,
            email: new_user.email,
            password: PasswordHash::new(&new_user.password),
            role: new_user.role,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list_patients(&self) -> Vec<Patient> {
        self.patients.read().await.clone()
    }

    async fn list_employees(&self) -> Vec<Employee> {
        self.employees.read().await.clone()
    }
}
