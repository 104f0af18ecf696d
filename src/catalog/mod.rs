//! Students and faculties: the business operations whose execution time
//! gets tracked.
//!
//! A student owns an optional `faculty_id`; a faculty's students are found by
//! lookup, never stored on the faculty.

pub mod seed;
pub mod service;

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use service::AcademicService;

// ─── Domain types ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    pub full_name: String,
    pub age: u32,
    pub faculty_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFaculty {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub full_name: String,
    pub age: u32,
    #[serde(default)]
    pub faculty_id: Option<u64>,
}

/// Every variant is a missing entity of some kind.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("student with id = {0} not found")]
    StudentNotFound(u64),

    #[error("faculty with id = {0} not found")]
    FacultyNotFound(u64),

    #[error("faculty named '{0}' not found")]
    FacultyNameNotFound(String),

    #[error("student with id = {0} has no faculty")]
    NoFaculty(u64),
}

// ─── In-memory catalog ───────────────────────────────────────────

#[derive(Default)]
struct Inner {
    faculties: BTreeMap<u64, Faculty>,
    students: BTreeMap<u64, Student>,
    next_faculty_id: u64,
    next_student_id: u64,
}

/// Thread-safe catalog. Reads share the lock, writes take it exclusively.
#[derive(Default)]
pub struct Catalog {
    inner: RwLock<Inner>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_faculty(&self, new: NewFaculty) -> Faculty {
        let mut inner = self.inner.write();
        inner.next_faculty_id += 1;
        let faculty = Faculty {
            id: inner.next_faculty_id,
            name: new.name,
        };
        inner.faculties.insert(faculty.id, faculty.clone());
        faculty
    }

    pub fn faculty(&self, id: u64) -> Result<Faculty, CatalogError> {
        self.inner
            .read()
            .faculties
            .get(&id)
            .cloned()
            .ok_or(CatalogError::FacultyNotFound(id))
    }

    pub fn faculty_by_name(&self, name: &str) -> Result<Faculty, CatalogError> {
        self.inner
            .read()
            .faculties
            .values()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| CatalogError::FacultyNameNotFound(name.to_owned()))
    }

    pub fn faculties(&self) -> Vec<Faculty> {
        self.inner.read().faculties.values().cloned().collect()
    }

    /// Remove a faculty; its students stay, detached.
    pub fn delete_faculty(&self, id: u64) -> Result<(), CatalogError> {
        let mut inner = self.inner.write();
        inner
            .faculties
            .remove(&id)
            .ok_or(CatalogError::FacultyNotFound(id))?;
        for student in inner.students.values_mut() {
            if student.faculty_id == Some(id) {
                student.faculty_id = None;
            }
        }
        Ok(())
    }

    pub fn create_student(&self, new: NewStudent) -> Result<Student, CatalogError> {
        let mut inner = self.inner.write();
        if let Some(faculty_id) = new.faculty_id {
            if !inner.faculties.contains_key(&faculty_id) {
                return Err(CatalogError::FacultyNotFound(faculty_id));
            }
        }
        inner.next_student_id += 1;
        let student = Student {
            id: inner.next_student_id,
            full_name: new.full_name,
            age: new.age,
            faculty_id: new.faculty_id,
        };
        inner.students.insert(student.id, student.clone());
        Ok(student)
    }

    pub fn student(&self, id: u64) -> Result<Student, CatalogError> {
        self.inner
            .read()
            .students
            .get(&id)
            .cloned()
            .ok_or(CatalogError::StudentNotFound(id))
    }

    pub fn students(&self) -> Vec<Student> {
        self.inner.read().students.values().cloned().collect()
    }

    /// Students with `min <= age <= max`.
    pub fn students_by_age_between(&self, min: u32, max: u32) -> Vec<Student> {
        self.inner
            .read()
            .students
            .values()
            .filter(|s| (min..=max).contains(&s.age))
            .cloned()
            .collect()
    }

    pub fn students_of_faculty(&self, faculty_id: u64) -> Result<Vec<Student>, CatalogError> {
        let inner = self.inner.read();
        if !inner.faculties.contains_key(&faculty_id) {
            return Err(CatalogError::FacultyNotFound(faculty_id));
        }
        Ok(inner
            .students
            .values()
            .filter(|s| s.faculty_id == Some(faculty_id))
            .cloned()
            .collect())
    }

    pub fn faculty_of_student(&self, student_id: u64) -> Result<Faculty, CatalogError> {
        let inner = self.inner.read();
        let student = inner
            .students
            .get(&student_id)
            .ok_or(CatalogError::StudentNotFound(student_id))?;
        let faculty_id = student
            .faculty_id
            .ok_or(CatalogError::NoFaculty(student_id))?;
        inner
            .faculties
            .get(&faculty_id)
            .cloned()
            .ok_or(CatalogError::FacultyNotFound(faculty_id))
    }

    pub fn delete_student(&self, id: u64) -> Result<(), CatalogError> {
        self.inner
            .write()
            .students
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogError::StudentNotFound(id))
    }
}
