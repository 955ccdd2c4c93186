use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Receptionist,
    Doctor,
    Patient,
}

impl Role {
    /// Front-desk roles that act on behalf of any patient.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Receptionist)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Receptionist => write!(f, "Receptionist"),
            Role::Doctor => write!(f, "Doctor"),
            Role::Patient => write!(f, "Patient"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Receptionist" => Ok(Role::Receptionist),
            "Doctor" => Ok(Role::Doctor),
            "Patient" => Ok(Role::Patient),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: Option<String>,
    pub role: Role,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub iat: Option<u64>,
    pub exp: Option<u64>,
}

/// Authenticated principal placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: Option<String>,
    pub role: Role,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

impl User {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when this principal is the patient owning `patient_id`.
    pub fn owns_patient(&self, patient_id: i64) -> bool {
        self.role == Role::Patient && self.patient_id == Some(patient_id)
    }

    /// True when this principal is the doctor with profile id `doctor_id`.
    pub fn is_doctor(&self, doctor_id: i64) -> bool {
        self.role == Role::Doctor && self.doctor_id == Some(doctor_id)
    }
}
