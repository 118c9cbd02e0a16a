//! Example records used to seed an empty local store.

use crate::entities::{Appointment, ContactInquiry, ManualMatch, Status};

pub fn seed_inquiries() -> Vec<ContactInquiry> {
    vec![
        ContactInquiry {
            id: "1".into(),
            name: "Sarah Johnson".into(),
            email: "sarah.j@example.com".into(),
            phone: Some("+91 98765 43210".into()),
            subject: "Curriculum Question".into(),
            message: "I would like to know more about the mathematics curriculum for 5th graders. Does it include advanced algebra prep?".into(),
            date: "2024-05-15".into(),
            status: Status::Pending,
        },
        ContactInquiry {
            id: "2".into(),
            name: "Michael Chen".into(),
            email: "m.chen@example.com".into(),
            phone: Some("+91 88888 77777".into()),
            subject: "School Tour".into(),
            message: "Are there any open slots for a school tour this Friday? We are planning to move to the area next month.".into(),
            date: "2024-05-14".into(),
            status: Status::Resolved,
        },
    ]
}

pub fn seed_appointments() -> Vec<Appointment> {
    vec![
        Appointment {
            id: "101".into(),
            parent_name: "Emily Williams".into(),
            child_name: "Leo Williams".into(),
            email: "emily@example.com".into(),
            phone: "555-0123".into(),
            date: "2024-05-20".into(),
            time: "10:00 AM".into(),
            topic: "Mid-term Progress Review".into(),
            status: Status::Scheduled,
            match_profile: None,
        },
        Appointment {
            id: "102".into(),
            parent_name: "David Miller".into(),
            child_name: "Sophia Miller".into(),
            email: "david.m@example.com".into(),
            phone: "555-0456".into(),
            date: "2024-05-21".into(),
            time: "02:30 PM".into(),
            topic: "Behavioral Consultation".into(),
            status: Status::Scheduled,
            match_profile: None,
        },
    ]
}

pub fn seed_manual_matches() -> Vec<ManualMatch> {
    vec![
        ManualMatch {
            id: "m-1".into(),
            parent_name: "Rohan Mehta".into(),
            phone_number: "+91 91234 56789".into(),
            subject: "Grade 10 ICSE Maths".into(),
            grade_level: "Grade 10".into(),
            status: Status::TrialPending,
            date_added: "2024-05-18".into(),
        },
        ManualMatch {
            id: "m-2".into(),
            parent_name: "Sneha Kapoor".into(),
            phone_number: "+91 99887 76655".into(),
            subject: "IELTS Preparation".into(),
            grade_level: "Adult".into(),
            status: Status::Assigned,
            date_added: "2024-05-17".into(),
        },
    ]
}
