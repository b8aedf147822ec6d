use chrono::NaiveDate;

use super::Builder;
use crate::errors::ExError;
use crate::model::{Company, Employee, EntityId};

/// Builds [`Company`] instances, embedding the output of employee builders
///
/// Employee builders are invoked in registration order on every `build`.
/// The lifetime lets decorating builders borrow a session for the duration
/// of the build.
pub struct CompanyBuilder<'a> {
    id: Option<EntityId>,
    name: String,
    founded_on: Option<NaiveDate>,
    employees: Vec<Box<dyn Builder<Employee> + 'a>>,
}

impl<'a> CompanyBuilder<'a> {
    /// Start from the default company, which has no employees
    pub fn a_company() -> Self {
        Self {
            id: None,
            name: "Thinking Labs".to_string(),
            founded_on: NaiveDate::from_ymd_opt(2012, 9, 1),
            employees: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn founded_on(mut self, date: NaiveDate) -> Self {
        self.founded_on = Some(date);
        self
    }

    /// Pre-assign the identity instead of letting storage assign it
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    /// Add one employee builder
    pub fn having_employee(mut self, builder: impl Builder<Employee> + 'a) -> Self {
        self.employees.push(Box::new(builder));
        self
    }

    /// Add several employee builders
    pub fn having_employees<I>(mut self, builders: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Builder<Employee> + 'a>>,
    {
        self.employees.extend(builders);
        self
    }
}

impl Default for CompanyBuilder<'_> {
    fn default() -> Self {
        Self::a_company()
    }
}

impl Builder<Company> for CompanyBuilder<'_> {
    fn build(&self) -> Result<Company, ExError> {
        let employees = self
            .employees
            .iter()
            .map(|b| b.build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Company {
            id: self.id,
            name: self.name.clone(),
            founded_on: self.founded_on,
            employees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{builder_fn, EmployeeBuilder};
    use crate::errors::ExErrorKind;

    #[test]
    fn test_default_company_has_no_employees() {
        let company = CompanyBuilder::a_company().build().unwrap();
        assert_eq!(company.name, "Thinking Labs");
        assert!(company.employees.is_empty());
        assert!(company.id.is_none());
    }

    #[test]
    fn test_embeds_employee_builder_output_in_order() {
        let company = CompanyBuilder::a_company()
            .named("Acme")
            .having_employee(EmployeeBuilder::an_employee().with_name("Joe Six Pack"))
            .having_employees(vec![
                Box::new(EmployeeBuilder::an_employee().with_name("Jane Doe"))
                    as Box<dyn Builder<Employee>>,
            ])
            .build()
            .unwrap();

        let names: Vec<&str> = company.employees.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Joe Six Pack", "Jane Doe"]);
        assert_eq!(company.name, "Acme");
    }

    #[test]
    fn test_employee_builder_failure_propagates() {
        let failing = builder_fn("Broken", || -> Result<Employee, ExError> {
            Err(ExError::new(ExErrorKind::Persistence).with_message("disk full"))
        });

        let err = CompanyBuilder::a_company()
            .having_employee(failing)
            .build()
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::Persistence);
    }
}
