//! Built-in attribute table for a KU Leuven style Shibboleth SP.

use super::definition::{Alias, AttributeDefinition};

/// (alias, header, multivalue, utf8)
const DEFAULT_ATTRIBUTES: &[(&str, &str, bool, bool)] = &[
    ("uid", "shib-person-uid", false, false),
    ("cn", "shib-person-commonname", false, true),
    ("sn", "shib-person-surname", false, true),
    ("givenName", "shib-person-givenname", false, true),
    ("mail", "shib-person-mail", true, false),
    ("ou", "shib-person-ou", true, false),
    ("telephoneNumber", "shib-person-telephonenumber", true, false),
    ("facsimileTelephoneNumber", "shib-person-facsimiletelephonenumber", true, false),
    ("mobile", "shib-person-mobile", true, false),
    ("postalAddress", "shib-person-postaladdress", true, false),
    ("affiliation", "shib-ep-unscopedaffiliation", true, false),
    ("scopedAffiliation", "shib-ep-scopedaffiliation", true, false),
    ("orgUnitDN", "shib-ep-orgunitdn", true, false),
    ("orgDN", "shib-ep-orgdn", false, false),
    ("logoutURL", "shib-logouturl", false, false),
    ("identityProvider", "shib-identity-provider", false, false),
    // Misspelled upstream; SP attribute maps were written against this name.
    ("originSite", "shib-origon-site", false, false),
    ("authenticationInstant", "shib-authentication-instant", false, false),
    ("employeeType", "shib-kul-employeetype", false, false),
    ("studentType", "shib-kul-studenttype", true, false),
    ("primouNumber", "shib-kul-primounumber", true, false),
    ("ouNumber", "shib-kul-ounumber", true, false),
    ("dipl", "shib-kul-dipl", true, false),
    ("opl", "shib-kul-opl", true, false),
    ("campus", "shib-kul-campus", false, false),
];

/// Definitions every schema starts from, in declaration order.
pub fn default_definitions() -> impl Iterator<Item = AttributeDefinition> {
    DEFAULT_ATTRIBUTES
        .iter()
        .filter_map(|&(alias, header, multivalue, utf8)| {
            let mut def = AttributeDefinition::new(Alias::parse(alias).ok()?, header);
            def.multivalue = multivalue;
            if utf8 {
                def = def.utf8();
            }
            Some(def)
        })
}
