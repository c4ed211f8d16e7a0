use crate::model::{
    employee::{Employee, Schedule},
    role::EmployeeRole,
    site::Site,
};

fn schedule(days: &[&str], start: &str, end: &str) -> Schedule {
    Schedule {
        days: days.iter().map(|d| d.to_string()).collect(),
        start: start.into(),
        end: end.into(),
    }
}

/// Roster returned before any employee document has been written.
pub fn employees() -> Vec<Employee> {
    vec![
        Employee {
            id: "1".into(),
            name: "Carlos Silva".into(),
            phone: "11999991234".into(),
            email: "carlos@obra.com".into(),
            role: EmployeeRole::Foreman,
            hourly_rate: 35.0,
            schedule: schedule(&["Seg", "Ter", "Qua", "Qui", "Sex"], "07:00", "16:00"),
            photo_url: None,
            active: true,
        },
        Employee {
            id: "2".into(),
            name: "Ana Souza".into(),
            phone: "11988885678".into(),
            email: "ana@obra.com".into(),
            role: EmployeeRole::Engineer,
            hourly_rate: 85.0,
            schedule: schedule(&["Seg", "Qua", "Sex"], "09:00", "17:00"),
            photo_url: None,
            active: true,
        },
    ]
}

pub fn sites() -> Vec<Site> {
    vec![
        Site {
            id: "1".into(),
            name: "Residencial Parque Verde".into(),
            address: "Rua das Flores, 123".into(),
            active: true,
        },
        Site {
            id: "2".into(),
            name: "Reforma Shopping Centro".into(),
            address: "Av. Central, 500".into(),
            active: true,
        },
    ]
}
