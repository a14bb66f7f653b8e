//! First-run directory provisioning.
//!
//! Schema creation is owned by migrations; this module only seeds the tag
//! catalogue and sample contacts into empty tables.

use crate::model::contact::{ContactStatus, NewContact, TagSet};
use crate::model::tag::default_tag_catalogue;
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use crate::repo::tag_repo::TagRepository;
use log::info;
use serde::Serialize;

/// Rows written by one provisioning call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub tags_seeded: usize,
    pub contacts_seeded: usize,
}

/// Seeds empty tables. Calling it again on a populated store is a no-op.
pub fn provision_directory<C, T>(contacts: &C, tags: &T) -> RepoResult<ProvisionReport>
where
    C: ContactRepository,
    T: TagRepository,
{
    let mut report = ProvisionReport::default();

    if tags.list_tag_references()?.is_empty() {
        for reference in default_tag_catalogue() {
            tags.add_tag_reference(&reference)?;
            report.tags_seeded += 1;
        }
    }

    if contacts.count_contacts()? == 0 {
        for contact in sample_contacts() {
            contacts.create_contact(&contact)?;
            report.contacts_seeded += 1;
        }
    }

    info!(
        "event=provision module=directory status=ok tags_seeded={} contacts_seeded={}",
        report.tags_seeded, report.contacts_seeded
    );
    Ok(report)
}

/// Sample leadership entries shown in a fresh directory.
pub fn sample_contacts() -> Vec<NewContact> {
    vec![
        SampleContact {
            full_name: "Rev. Michael Johnson",
            title: "Regional Director",
            email: "m.johnson@familyfed.org",
            phone: "(617) 555-0123",
            location: "Boston, MA",
            bio: "Rev. Johnson has served the Northeast region for 15 years, focusing on family \
                  ministry and community building. He leads our regional initiatives and \
                  coordinates with state leaders.",
            photo_url: "https://drive.google.com/file/d/sample1",
            tags: "regional-director,pastor,massachusetts,board-member,emergency-contact",
        },
        SampleContact {
            full_name: "Mrs. Sarah Chen",
            title: "Education Director",
            email: "s.chen@familyfed.org",
            phone: "(212) 555-0456",
            location: "New York, NY",
            bio: "Mrs. Chen oversees educational programs across the region with 12 years of \
                  experience. She specializes in youth development and character education \
                  initiatives.",
            photo_url: "https://drive.google.com/file/d/sample2",
            tags: "regional-director,education-director,youth-leader,new-york,monthly-reports",
        },
        SampleContact {
            full_name: "Rev. David Rodriguez",
            title: "Massachusetts State Leader",
            email: "d.rodriguez@familyfed.org",
            phone: "(413) 555-0789",
            location: "Springfield, MA",
            bio: "Rev. Rodriguez leads Massachusetts communities with focus on family unity and \
                  social service. He coordinates local centers and statewide programs.",
            photo_url: "https://drive.google.com/file/d/sample3",
            tags: "state-leader,pastor,massachusetts,community-outreach,monthly-reports",
        },
        SampleContact {
            full_name: "Mrs. Jennifer Kim",
            title: "Connecticut State Leader",
            email: "j.kim@familyfed.org",
            phone: "(860) 555-0321",
            location: "Hartford, CT",
            bio: "Mrs. Kim focuses on strengthening family bonds and organizing interfaith \
                  dialogue events throughout Connecticut.",
            photo_url: "https://drive.google.com/file/d/sample4",
            tags: "state-leader,connecticut,interfaith-relations,family-ministry",
        },
        SampleContact {
            full_name: "Mrs. Maria Santos",
            title: "Youth Ministry Leader",
            email: "m.santos@familyfed.org",
            phone: "(203) 555-0987",
            location: "New Haven, CT",
            bio: "Mrs. Santos coordinates youth programs and summer camps across the region. \
                  She's passionate about empowering young people to become future leaders.",
            photo_url: "https://drive.google.com/file/d/sample5",
            tags: "youth-leader,ministry-leader,connecticut,training-updates,event-coordination",
        },
    ]
    .into_iter()
    .map(SampleContact::into_new_contact)
    .collect()
}

struct SampleContact {
    full_name: &'static str,
    title: &'static str,
    email: &'static str,
    phone: &'static str,
    location: &'static str,
    bio: &'static str,
    photo_url: &'static str,
    tags: &'static str,
}

impl SampleContact {
    fn into_new_contact(self) -> NewContact {
        NewContact {
            full_name: self.full_name.to_string(),
            title: self.title.to_string(),
            email: self.email.to_string(),
            phone: self.phone.to_string(),
            location: self.location.to_string(),
            bio: self.bio.to_string(),
            photo_url: self.photo_url.to_string(),
            tags: TagSet::parse(self.tags),
            website_display: true,
            status: ContactStatus::Active,
        }
    }
}
