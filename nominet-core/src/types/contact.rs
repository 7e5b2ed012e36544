//! Registrant contact as entered by the account holder

use nominet_epp::{Contact, ContactExtension, ContactInfo, PostalInfoType, RegistrantType};
use serde::{Deserialize, Serialize};

/// Flat contact form, split into first and last name.
///
/// Converted to the registry's [`Contact`] + [`ContactExtension`] pair when sent, and
/// rebuilt from [`ContactInfo`] when read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub org_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// ISO 3166 alpha-2 country code.
    pub country: String,
    pub registrant_type: Option<RegistrantType>,
    pub trading_name: String,
    pub company_number: String,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ContactDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Contacts without any name are not sent to the registry.
    pub fn has_name(&self) -> bool {
        !self.first_name.trim().is_empty() || !self.last_name.trim().is_empty()
    }

    pub fn extension(&self) -> ContactExtension {
        ContactExtension {
            registrant_type: self.registrant_type,
            trading_name: non_empty(&self.trading_name),
            company_number: non_empty(&self.company_number),
        }
    }

    /// Registry contact with the already formatted `voice` number.
    pub fn to_contact(&self, voice: Option<String>) -> Contact {
        Contact {
            id: None,
            name: self.full_name(),
            organization: non_empty(&self.org_name),
            street: [&self.address1, &self.address2]
                .into_iter()
                .filter_map(|line| non_empty(line))
                .collect(),
            city: self.city.trim().to_string(),
            province: non_empty(&self.state),
            postal_code: non_empty(&self.zip),
            country_code: self.country.trim().to_ascii_uppercase(),
            voice: voice.filter(|v| !v.is_empty()),
            email: self.email.trim().to_string(),
            auth_password: None,
            postal_type: PostalInfoType::for_country(&self.country),
        }
    }

    /// Splits the stored name at the first space.
    pub fn from_contact_info(info: &ContactInfo) -> Self {
        let contact = &info.contact;
        let (first_name, last_name) = match contact.name.trim().split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (contact.name.trim().to_string(), String::new()),
        };
        let mut street = contact.street.iter();

        Self {
            first_name,
            last_name,
            org_name: contact.organization.clone().unwrap_or_default(),
            email: contact.email.clone(),
            phone: contact.voice.clone().unwrap_or_default(),
            address1: street.next().cloned().unwrap_or_default(),
            address2: street.next().cloned().unwrap_or_default(),
            city: contact.city.clone(),
            state: contact.province.clone().unwrap_or_default(),
            zip: contact.postal_code.clone().unwrap_or_default(),
            country: contact.country_code.clone(),
            registrant_type: info.extension.registrant_type,
            trading_name: info.extension.trading_name.clone().unwrap_or_default(),
            company_number: info.extension.company_number.clone().unwrap_or_default(),
        }
    }
}
