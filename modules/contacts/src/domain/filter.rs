use crate::contract::model::Contact;

/// Contacts whose name, phone or email contains `query`, ignoring case.
///
/// An empty query returns every contact. Order is preserved.
pub fn filtered_contacts(contacts: &[Contact], query: &str) -> Vec<Contact> {
    if query.is_empty() {
        return contacts.to_vec();
    }
    let needle = query.to_lowercase();
    contacts
        .iter()
        .filter(|c| c.matches_lowercase(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, phone: &str, email: &str) -> Contact {
        Contact {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Contact> {
        vec![
            contact("Ana", "5512345678", "a@x.com"),
            contact("Bruno", "5588889999", "bruno@mail.mx"),
            contact("Carla", "5511110000", "CARLA@X.COM"),
        ]
    }

    #[test]
    fn empty_query_is_identity() {
        let all = sample();
        assert_eq!(filtered_contacts(&all, ""), all);
    }

    #[test]
    fn matches_any_field_case_insensitively() {
        let all = sample();
        let names: Vec<_> = filtered_contacts(&all, "x.com")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Carla"]);

        assert_eq!(filtered_contacts(&all, "BRU").len(), 1);
        assert_eq!(filtered_contacts(&all, "8888")[0].name, "Bruno");
    }

    #[test]
    fn every_name_substring_finds_its_contact() {
        let all = sample();
        for c in &all {
            let chars: Vec<char> = c.name.chars().collect();
            for start in 0..chars.len() {
                for end in start + 1..=chars.len() {
                    let sub: String = chars[start..end].iter().collect();
                    let upper = sub.to_uppercase();
                    assert!(filtered_contacts(&all, &sub).contains(c), "{sub}");
                    assert!(filtered_contacts(&all, &upper).contains(c), "{upper}");
                }
            }
        }
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filtered_contacts(&sample(), "999").is_empty());
    }
}
