//! Employee accounts. Employees are never deleted, only deactivated, so their
//! past purchases keep resolving.

use crate::{
    entities::{Employee, EmployeeStatus, employee},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Every employee ordered by name.
pub async fn get_all_employees(db: &DatabaseConnection) -> Result<Vec<employee::Model>> {
    Employee::find()
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Employees who can currently buy from the menu.
pub async fn get_active_employees(db: &DatabaseConnection) -> Result<Vec<employee::Model>> {
    Employee::find()
        .filter(employee::Column::Status.eq(EmployeeStatus::Active))
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers an active employee.
///
/// # Errors
/// Returns a validation error for an empty name or role, or a database error.
pub async fn create_employee(
    db: &DatabaseConnection,
    name: &str,
    role: &str,
) -> Result<employee::Model> {
    let (name, role) = (name.trim(), role.trim());
    if name.is_empty() || role.is_empty() {
        return Err(Error::Validation {
            message: "Employee name and role are required".to_string(),
        });
    }

    let model = employee::ActiveModel {
        name: Set(name.to_string()),
        role: Set(role.to_string()),
        status: Set(EmployeeStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(employee_id = model.id, "Registered employee '{}'", model.name);
    Ok(model)
}

/// Activates or deactivates an employee.
///
/// # Errors
/// Returns `EmployeeNotFound` or a database error.
pub async fn set_employee_status(
    db: &DatabaseConnection,
    employee_id: i64,
    status: EmployeeStatus,
) -> Result<employee::Model> {
    let employee = Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or(Error::EmployeeNotFound { id: employee_id })?;

    let mut active: employee::ActiveModel = employee.into();
    active.status = Set(status);
    let updated = active.update(db).await?;
    info!(employee_id, "Employee '{}' is now {:?}", updated.name, status);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_employee_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let luis = create_employee(&db, "Luis", "Camarista").await?;
        let ana = create_employee(&db, " Ana ", "Recepción").await?;
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.status, EmployeeStatus::Active);

        let all = get_all_employees(&db).await?;
        assert_eq!(all, vec![ana.clone(), luis.clone()]);

        set_employee_status(&db, luis.id, EmployeeStatus::Inactive).await?;
        let active = get_active_employees(&db).await?;
        assert_eq!(active, vec![ana]);
        Ok(())
    }

    #[tokio::test]
    async fn test_employee_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_employee(&db, "", "Recepción").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = set_employee_status(&db, 42, EmployeeStatus::Inactive).await;
        assert!(matches!(result, Err(Error::EmployeeNotFound { id: 42 })));
        Ok(())
    }
}
