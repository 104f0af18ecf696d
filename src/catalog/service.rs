use std::sync::Arc;

use tracing::info;

use super::{Catalog, CatalogError, Faculty, NewFaculty, NewStudent, Student};
use crate::tracking::{Interceptor, TrackingError};

/// Catalog operations as the HTTP layer sees them.
///
/// Single-entity lookups are timed in deferred mode, full listings in sync
/// mode; everything else runs untracked.
#[derive(Clone)]
pub struct AcademicService {
    catalog: Arc<Catalog>,
    interceptor: Interceptor,
}

impl AcademicService {
    pub fn new(catalog: Arc<Catalog>, interceptor: Interceptor) -> Self {
        Self {
            catalog,
            interceptor,
        }
    }

    // ── Students ────────────────────────────────────────────────

    pub fn create_student(&self, new: NewStudent) -> Result<Student, CatalogError> {
        let student = self.catalog.create_student(new)?;
        info!(id = student.id, "student created");
        Ok(student)
    }

    pub async fn find_student(&self, id: u64) -> Result<Student, TrackingError> {
        self.interceptor
            .deferred("find_student_by_id", move || async move { self.catalog.student(id) })
            .await
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, TrackingError> {
        self.interceptor
            .sync("find_all_students", move || async move {
                Ok::<_, CatalogError>(self.catalog.students())
            })
            .await
    }

    pub fn students_by_age_between(&self, min: u32, max: u32) -> Vec<Student> {
        self.catalog.students_by_age_between(min, max)
    }

    pub fn faculty_of_student(&self, student_id: u64) -> Result<Faculty, CatalogError> {
        self.catalog.faculty_of_student(student_id)
    }

    pub fn delete_student(&self, id: u64) -> Result<(), CatalogError> {
        self.catalog.delete_student(id)?;
        info!(id, "student deleted");
        Ok(())
    }

    // ── Faculties ───────────────────────────────────────────────

    pub fn create_faculty(&self, new: NewFaculty) -> Faculty {
        let faculty = self.catalog.create_faculty(new);
        info!(id = faculty.id, name = %faculty.name, "faculty created");
        faculty
    }

    pub async fn find_faculty(&self, id: u64) -> Result<Faculty, TrackingError> {
        self.interceptor
            .deferred("find_faculty_by_id", move || async move { self.catalog.faculty(id) })
            .await
    }

    pub async fn list_faculties(&self) -> Result<Vec<Faculty>, TrackingError> {
        self.interceptor
            .sync("find_all_faculties", move || async move {
                Ok::<_, CatalogError>(self.catalog.faculties())
            })
            .await
    }

    pub fn faculty_by_name(&self, name: &str) -> Result<Faculty, CatalogError> {
        self.catalog.faculty_by_name(name)
    }

    pub fn students_of_faculty(&self, faculty_id: u64) -> Result<Vec<Student>, CatalogError> {
        self.catalog.students_of_faculty(faculty_id)
    }

    pub fn delete_faculty(&self, id: u64) -> Result<(), CatalogError> {
        self.catalog.delete_faculty(id)?;
        info!(id, "faculty deleted");
        Ok(())
    }
}
