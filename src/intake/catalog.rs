//! Fixed option lists offered by the intake forms.

use crate::form::SelectOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Physician {
    pub name: &'static str,
    pub image: &'static str,
}

pub const PHYSICIANS: [Physician; 9] = [
    Physician { name: "John Green", image: "/assets/images/dr-green.png" },
    Physician { name: "Leila Cameron", image: "/assets/images/dr-cameron.png" },
    Physician { name: "David Livingston", image: "/assets/images/dr-livingston.png" },
    Physician { name: "Evan Peter", image: "/assets/images/dr-peter.png" },
    Physician { name: "Jane Powell", image: "/assets/images/dr-powell.png" },
    Physician { name: "Alex Ramirez", image: "/assets/images/dr-remirez.png" },
    Physician { name: "Jasmine Lee", image: "/assets/images/dr-lee.png" },
    Physician { name: "Alyana Cruz", image: "/assets/images/dr-cruz.png" },
    Physician { name: "Hardik Sharma", image: "/assets/images/dr-sharma.png" },
];

pub const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];

pub const IDENTIFICATION_TYPES: [&str; 11] = [
    "Birth Certificate",
    "Driver's License",
    "Medical Insurance Card/Policy",
    "Military ID Card",
    "National Identity Card",
    "Passport",
    "Resident Alien Card (Green Card)",
    "Social Security Card",
    "State ID Card",
    "Student ID Card",
    "Voter ID Card",
];

pub fn physician_options() -> Vec<SelectOption> {
    PHYSICIANS
        .iter()
        .map(|doctor| SelectOption::new(doctor.name).with_image(doctor.image))
        .collect()
}

pub fn identification_options() -> Vec<SelectOption> {
    IDENTIFICATION_TYPES
        .iter()
        .map(|kind| SelectOption::new(*kind))
        .collect()
}

pub fn physician_names() -> impl Iterator<Item = &'static str> {
    PHYSICIANS.iter().map(|doctor| doctor.name)
}
