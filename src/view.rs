use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::csv;
use crate::error::{Error, Result};
use crate::filter;
use crate::models::{
    column_by_key, Column, Intern, InternDraft, InternPatch, InternshipStatus, InternshipType,
    BOOL_COLUMNS, DEFAULT_VISIBLE,
};
use crate::store::Store;

/// Form payload for creating an intern record; identity, ownership, and
/// timestamps are assigned on submit.
#[derive(Debug, Clone)]
pub struct InternForm {
    pub intern_name: String,
    pub email: String,
    pub phone_number: String,
    pub internship_status: InternshipStatus,
    pub date_applied: String,
    pub interviewer: String,
    pub internship_type: InternshipType,
    pub joining_date: String,
    pub duration: String,
    pub accepted_offer_letter: bool,
    pub notes: String,
    pub performance_rating: i32,
    pub full_time_conversion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub shown: usize,
    pub total: usize,
    pub ongoing: usize,
    pub converted: usize,
}

/// One person's dashboard: the loaded record snapshot plus search,
/// filter, column-visibility, and selection state. Every mutation goes
/// to the store first and touches local state only once the store has
/// confirmed.
pub struct Dashboard<'a> {
    store: &'a dyn Store,
    person_id: Uuid,
    person_name: String,
    interns: Vec<Intern>,
    pub search_query: String,
    pub status_filter: String,
    pub type_filter: String,
    pub column_filters: BTreeMap<String, String>,
    visible_columns: Vec<&'static str>,
    selected: Option<Uuid>,
}

impl<'a> Dashboard<'a> {
    pub async fn load(
        store: &'a dyn Store,
        person_id: Uuid,
        person_name: impl Into<String>,
    ) -> Result<Dashboard<'a>> {
        let interns = store.list_interns(person_id).await?;
        Ok(Dashboard {
            store,
            person_id,
            person_name: person_name.into(),
            interns,
            search_query: String::new(),
            status_filter: filter::ALL.to_string(),
            type_filter: filter::ALL.to_string(),
            column_filters: BTreeMap::new(),
            visible_columns: DEFAULT_VISIBLE.to_vec(),
            selected: None,
        })
    }

    pub fn person_name(&self) -> &str {
        &self.person_name
    }

    pub fn interns(&self) -> &[Intern] {
        &self.interns
    }

    pub fn visible_columns(&self) -> Vec<Column> {
        self.visible_columns
            .iter()
            .filter_map(|key| column_by_key(key))
            .collect()
    }

    pub fn set_visible_columns(&mut self, keys: &[String]) -> Result<()> {
        let mut columns = Vec::new();
        for key in keys {
            let column = column_by_key(key)
                .ok_or_else(|| Error::Validation(format!("unknown column: {key}")))?;
            columns.push(column.key);
        }
        self.visible_columns = columns;
        Ok(())
    }

    pub fn toggle_column(&mut self, key: &str) -> Result<bool> {
        let column =
            column_by_key(key).ok_or_else(|| Error::Validation(format!("unknown column: {key}")))?;
        if let Some(index) = self.visible_columns.iter().position(|k| *k == column.key) {
            self.visible_columns.remove(index);
            Ok(false)
        } else {
            self.visible_columns.push(column.key);
            Ok(true)
        }
    }

    pub fn select(&mut self, id: Uuid) -> Result<&Intern> {
        let intern = self
            .interns
            .iter()
            .find(|intern| intern.id == id)
            .ok_or_else(|| Error::Validation(format!("no intern with id {id}")))?;
        self.selected = Some(id);
        Ok(intern)
    }

    pub fn selected(&self) -> Option<&Intern> {
        let id = self.selected?;
        self.interns.iter().find(|intern| intern.id == id)
    }

    /// The visible subset: search AND status AND type AND every active
    /// per-column filter.
    pub fn visible_interns(&self) -> Vec<&Intern> {
        self.interns
            .iter()
            .filter(|intern| {
                filter::matches_search(intern, &self.search_query)
                    && filter::matches_status(intern, &self.status_filter)
                    && filter::matches_type(intern, &self.type_filter)
                    && self
                        .column_filters
                        .iter()
                        .all(|(key, value)| filter::matches_column(intern, key, value))
            })
            .collect()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            shown: self.visible_interns().len(),
            total: self.interns.len(),
            ongoing: self
                .interns
                .iter()
                .filter(|i| i.internship_status == InternshipStatus::Ongoing)
                .count(),
            converted: self
                .interns
                .iter()
                .filter(|i| i.full_time_conversion)
                .count(),
        }
    }

    pub async fn add_intern(&mut self, form: InternForm) -> Result<()> {
        if form.intern_name.trim().is_empty() {
            return Err(Error::Validation("intern name is required".to_string()));
        }
        if form.email.trim().is_empty() {
            return Err(Error::Validation("email is required".to_string()));
        }
        if !(0..=5).contains(&form.performance_rating) {
            return Err(Error::Validation(
                "performance rating must be between 0 and 5".to_string(),
            ));
        }

        let now = Utc::now();
        let intern = Intern {
            id: Uuid::new_v4(),
            sr_no: self.interns.len() as i32 + 1,
            intern_name: form.intern_name,
            email: form.email,
            phone_number: form.phone_number,
            internship_status: form.internship_status,
            date_applied: form.date_applied,
            interviewer: form.interviewer,
            internship_type: form.internship_type,
            joining_date: form.joining_date,
            duration: form.duration,
            accepted_offer_letter: form.accepted_offer_letter,
            notes: form.notes,
            performance_rating: form.performance_rating,
            full_time_conversion: form.full_time_conversion,
            person_id: self.person_id,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_intern(&intern).await?;
        self.interns.push(intern);
        Ok(())
    }

    pub async fn update_intern(&mut self, id: Uuid, patch: InternPatch) -> Result<()> {
        if patch.is_empty() {
            return Err(Error::Validation("nothing to update".to_string()));
        }
        if matches!(&patch.intern_name, Some(name) if name.trim().is_empty()) {
            return Err(Error::Validation("intern name is required".to_string()));
        }
        if matches!(&patch.email, Some(email) if email.trim().is_empty()) {
            return Err(Error::Validation("email is required".to_string()));
        }
        if matches!(patch.performance_rating, Some(rating) if !(0..=5).contains(&rating)) {
            return Err(Error::Validation(
                "performance rating must be between 0 and 5".to_string(),
            ));
        }

        let index = self
            .interns
            .iter()
            .position(|intern| intern.id == id)
            .ok_or_else(|| Error::Validation(format!("no intern with id {id}")))?;

        self.store.update_intern(id, &patch).await?;
        patch.apply(&mut self.interns[index], Utc::now());
        Ok(())
    }

    /// Inline single-cell edit. Boolean and rating cells coerce the way
    /// the importer does; status and type must name a real variant.
    pub async fn set_cell(&mut self, id: Uuid, column: &str, raw: &str) -> Result<()> {
        let mut patch = InternPatch::default();
        match column {
            "intern_name" => patch.intern_name = Some(raw.to_string()),
            "email" => patch.email = Some(raw.to_string()),
            "phone_number" => patch.phone_number = Some(raw.to_string()),
            "internship_status" => {
                let status = raw.parse().map_err(Error::Validation)?;
                patch.internship_status = Some(status);
            }
            "internship_type" => {
                let kind = raw.parse().map_err(Error::Validation)?;
                patch.internship_type = Some(kind);
            }
            "date_applied" => patch.date_applied = Some(raw.to_string()),
            "interviewer" => patch.interviewer = Some(raw.to_string()),
            "joining_date" => patch.joining_date = Some(raw.to_string()),
            "duration" => patch.duration = Some(raw.to_string()),
            "notes" => patch.notes = Some(raw.to_string()),
            key if BOOL_COLUMNS.contains(&key) => {
                let value = raw.eq_ignore_ascii_case("yes") || raw.eq_ignore_ascii_case("true");
                if key == "accepted_offer_letter" {
                    patch.accepted_offer_letter = Some(value);
                } else {
                    patch.full_time_conversion = Some(value);
                }
            }
            "performance_rating" => {
                patch.performance_rating = Some(raw.trim().parse().unwrap_or(0));
            }
            "sr_no" => {
                return Err(Error::Validation("sr_no is assigned automatically".to_string()));
            }
            other => return Err(Error::Validation(format!("unknown column: {other}"))),
        }
        self.update_intern(id, patch).await
    }

    /// Delete one record, then renumber the survivors back to a
    /// contiguous 1..N in their original relative order. Each shifted
    /// record is patched individually; there is no surrounding
    /// transaction.
    pub async fn delete_intern(&mut self, id: Uuid) -> Result<Intern> {
        let index = self
            .interns
            .iter()
            .position(|intern| intern.id == id)
            .ok_or_else(|| Error::Validation(format!("no intern with id {id}")))?;

        self.store.delete_intern(id).await?;
        let removed = self.interns.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }

        for (position, intern) in self.interns.iter_mut().enumerate() {
            let expected = position as i32 + 1;
            if intern.sr_no != expected {
                let patch = InternPatch {
                    sr_no: Some(expected),
                    ..InternPatch::default()
                };
                self.store.update_intern(intern.id, &patch).await?;
                intern.sr_no = expected;
            }
        }

        Ok(removed)
    }

    /// Commit parsed drafts: merge each with defaults, number them past
    /// the current end of the list, and append after one batch insert.
    pub async fn import(&mut self, drafts: Vec<InternDraft>) -> Result<usize> {
        let now = Utc::now();
        let base = self.interns.len() as i32;
        let merged: Vec<Intern> = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                Intern::from_draft(draft, self.person_id, base + index as i32 + 1, now)
            })
            .collect();

        self.store.insert_interns(&merged).await?;
        let count = merged.len();
        self.interns.extend(merged);
        tracing::info!(count, person = %self.person_id, "imported intern records");
        Ok(count)
    }

    /// Export the full (unfiltered) record set. Returns the download
    /// file name and the CSV text.
    pub fn export(&self, today: NaiveDate) -> (String, String) {
        (
            csv::export_file_name(&self.person_name, today),
            csv::serialize(&self.interns),
        )
    }

    pub fn unique_values(&self, column: &str) -> Result<Vec<String>> {
        if column_by_key(column).is_none() {
            return Err(Error::Validation(format!("unknown column: {column}")));
        }
        Ok(filter::unique_values(&self.interns, column))
    }
}

pub fn default_form(today: NaiveDate) -> InternForm {
    InternForm {
        intern_name: String::new(),
        email: String::new(),
        phone_number: String::new(),
        internship_status: InternshipStatus::Applied,
        date_applied: today.to_string(),
        interviewer: String::new(),
        internship_type: InternshipType::Remote,
        joining_date: String::new(),
        duration: String::new(),
        accepted_offer_letter: false,
        notes: String::new(),
        performance_rating: 0,
        full_time_conversion: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    // Shadow the crate-level alias; the trait impl needs the two-arg form.
    use std::result::Result;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::models::Person;
    use crate::store::StoreError;

    #[derive(Default)]
    struct MemStore {
        persons: Mutex<Vec<Person>>,
        interns: Mutex<Vec<Intern>>,
        fail: AtomicBool,
    }

    impl MemStore {
        fn check(&self) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(StoreError("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn intern_count(&self) -> usize {
            self.interns.lock().unwrap().len()
        }

        fn stored_sr_nos(&self) -> Vec<i32> {
            let mut interns = self.interns.lock().unwrap().clone();
            interns.sort_by_key(|intern| intern.sr_no);
            interns.iter().map(|intern| intern.sr_no).collect()
        }
    }

    #[async_trait]
    impl Store for MemStore {
        async fn list_persons(&self, user_id: Uuid) -> Result<Vec<Person>, StoreError> {
            self.check()?;
            Ok(self
                .persons
                .lock()
                .unwrap()
                .iter()
                .filter(|person| person.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn insert_person(&self, person: &Person) -> Result<(), StoreError> {
            self.check()?;
            self.persons.lock().unwrap().push(person.clone());
            Ok(())
        }

        async fn rename_person(&self, id: Uuid, name: &str) -> Result<(), StoreError> {
            self.check()?;
            for person in self.persons.lock().unwrap().iter_mut() {
                if person.id == id {
                    person.name = name.to_string();
                }
            }
            Ok(())
        }

        async fn delete_persons(&self, ids: &[Uuid]) -> Result<(), StoreError> {
            self.check()?;
            self.persons
                .lock()
                .unwrap()
                .retain(|person| !ids.contains(&person.id));
            self.interns
                .lock()
                .unwrap()
                .retain(|intern| !ids.contains(&intern.person_id));
            Ok(())
        }

        async fn list_interns(&self, person_id: Uuid) -> Result<Vec<Intern>, StoreError> {
            self.check()?;
            let mut interns: Vec<Intern> = self
                .interns
                .lock()
                .unwrap()
                .iter()
                .filter(|intern| intern.person_id == person_id)
                .cloned()
                .collect();
            interns.sort_by_key(|intern| intern.sr_no);
            Ok(interns)
        }

        async fn insert_intern(&self, intern: &Intern) -> Result<(), StoreError> {
            self.insert_interns(std::slice::from_ref(intern)).await
        }

        async fn insert_interns(&self, interns: &[Intern]) -> Result<(), StoreError> {
            self.check()?;
            self.interns.lock().unwrap().extend_from_slice(interns);
            Ok(())
        }

        async fn update_intern(&self, id: Uuid, patch: &InternPatch) -> Result<(), StoreError> {
            self.check()?;
            for intern in self.interns.lock().unwrap().iter_mut() {
                if intern.id == id {
                    patch.apply(intern, Utc::now());
                }
            }
            Ok(())
        }

        async fn delete_intern(&self, id: Uuid) -> Result<(), StoreError> {
            self.check()?;
            self.interns.lock().unwrap().retain(|intern| intern.id != id);
            Ok(())
        }
    }

    fn form(name: &str, email: &str) -> InternForm {
        InternForm {
            intern_name: name.to_string(),
            email: email.to_string(),
            ..default_form(Utc::now().date_naive())
        }
    }

    async fn dashboard(store: &MemStore) -> Dashboard<'_> {
        Dashboard::load(store, Uuid::new_v4(), "HR Department")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn add_requires_name_and_email_before_touching_store() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;

        let result = dash.add_intern(form("", "a@x.com")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = dash.add_intern(form("Ana", "")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.intern_count(), 0);

        dash.add_intern(form("Ana", "a@x.com")).await.unwrap();
        assert_eq!(store.intern_count(), 1);
        assert_eq!(dash.interns()[0].sr_no, 1);
    }

    #[tokio::test]
    async fn store_failure_leaves_local_state_unchanged() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;
        dash.add_intern(form("Ana", "a@x.com")).await.unwrap();

        store.fail.store(true, Ordering::SeqCst);
        let result = dash.add_intern(form("Ben", "b@x.com")).await;
        assert!(matches!(result, Err(Error::Store(_))));
        assert_eq!(dash.interns().len(), 1);

        let result = dash.delete_intern(dash.interns()[0].id).await;
        assert!(matches!(result, Err(Error::Store(_))));
        assert_eq!(dash.interns().len(), 1);
    }

    #[tokio::test]
    async fn delete_renumbers_survivors_contiguously() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;
        for (name, email) in [("Ana", "a@x.com"), ("Ben", "b@x.com"), ("Cy", "c@x.com")] {
            dash.add_intern(form(name, email)).await.unwrap();
        }

        let middle = dash.interns()[1].id;
        dash.select(middle).unwrap();
        let removed = dash.delete_intern(middle).await.unwrap();
        assert_eq!(removed.intern_name, "Ben");
        assert!(dash.selected().is_none());

        let names: Vec<&str> = dash
            .interns()
            .iter()
            .map(|intern| intern.intern_name.as_str())
            .collect();
        assert_eq!(names, ["Ana", "Cy"]);
        let sr_nos: Vec<i32> = dash.interns().iter().map(|intern| intern.sr_no).collect();
        assert_eq!(sr_nos, [1, 2]);
        assert_eq!(store.stored_sr_nos(), [1, 2]);
    }

    #[tokio::test]
    async fn import_merges_defaults_and_continues_numbering() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;
        dash.add_intern(form("Ana", "a@x.com")).await.unwrap();

        let drafts = vec![
            InternDraft {
                intern_name: Some("Ben".to_string()),
                internship_status: Some("Interviewed".to_string()),
                accepted_offer_letter: Some(true),
                ..InternDraft::default()
            },
            InternDraft {
                email: Some("cy@x.com".to_string()),
                ..InternDraft::default()
            },
        ];

        let count = dash.import(drafts).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.intern_count(), 3);

        let ben = &dash.interns()[1];
        assert_eq!(ben.sr_no, 2);
        assert_eq!(ben.internship_status, InternshipStatus::Interviewed);
        assert!(ben.accepted_offer_letter);
        assert_eq!(ben.email, "");

        let cy = &dash.interns()[2];
        assert_eq!(cy.sr_no, 3);
        assert_eq!(cy.intern_name, "");
        assert_eq!(cy.internship_type, InternshipType::Remote);
    }

    #[tokio::test]
    async fn set_cell_coerces_like_the_importer() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;
        dash.add_intern(form("Ana", "a@x.com")).await.unwrap();
        let id = dash.interns()[0].id;

        dash.set_cell(id, "full_time_conversion", "YES").await.unwrap();
        assert!(dash.interns()[0].full_time_conversion);

        dash.set_cell(id, "performance_rating", "great").await.unwrap();
        assert_eq!(dash.interns()[0].performance_rating, 0);

        dash.set_cell(id, "internship_status", "Accepted").await.unwrap();
        assert_eq!(
            dash.interns()[0].internship_status,
            InternshipStatus::Accepted
        );

        let result = dash.set_cell(id, "internship_status", "Abandoned").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = dash.set_cell(id, "sr_no", "9").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn edit_blanking_required_fields_is_rejected() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;
        dash.add_intern(form("Ana", "a@x.com")).await.unwrap();
        let id = dash.interns()[0].id;

        let result = dash.set_cell(id, "intern_name", "").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(dash.interns()[0].intern_name, "Ana");
    }

    #[tokio::test]
    async fn visible_interns_and_stats_follow_filters() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;
        for (name, email) in [("Ana", "a@x.com"), ("Ben", "b@x.com")] {
            dash.add_intern(form(name, email)).await.unwrap();
        }
        let id = dash.interns()[0].id;
        dash.set_cell(id, "internship_status", "Ongoing").await.unwrap();
        dash.set_cell(id, "full_time_conversion", "yes").await.unwrap();

        dash.search_query = "ana".to_string();
        assert_eq!(dash.visible_interns().len(), 1);

        dash.search_query.clear();
        dash.status_filter = "Ongoing".to_string();
        assert_eq!(dash.visible_interns().len(), 1);

        let stats = dash.stats();
        assert_eq!(stats.shown, 1);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.ongoing, 1);
        assert_eq!(stats.converted, 1);
    }

    #[tokio::test]
    async fn export_names_the_file_after_the_person() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;
        dash.add_intern(form("Ana", "a@x.com")).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let (name, content) = dash.export(today);
        assert_eq!(name, "interns_HR_Department_2026-08-04.csv");
        assert!(content.lines().count() == 2);
    }

    #[tokio::test]
    async fn column_visibility_toggles() {
        let store = MemStore::default();
        let mut dash = dashboard(&store).await;

        assert_eq!(dash.visible_columns().len(), DEFAULT_VISIBLE.len());
        assert!(!dash.toggle_column("sr_no").unwrap());
        assert_eq!(dash.visible_columns().len(), DEFAULT_VISIBLE.len() - 1);
        assert!(dash.toggle_column("notes").unwrap());
        assert!(dash.toggle_column("bogus").is_err());
        assert!(dash.set_visible_columns(&["intern_name".to_string()]).is_ok());
        assert_eq!(dash.visible_columns().len(), 1);
    }
}
