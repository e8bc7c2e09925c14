use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::input;
use crate::model::DEFAULT_OWNER;
use crate::output::{self, Format, ListView};
use crate::store::repo::Repo;

/// Interpret the optional `list` argument: `pending` (default), `all`, or a date phrase.
pub fn view_for(selector: Option<&str>) -> Result<ListView> {
    match selector.map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(ListView::Pending),
        Some(s) if s == "pending" => Ok(ListView::Pending),
        Some(s) if s == "all" => Ok(ListView::All),
        Some(s) => Ok(ListView::ByDate(input::parse_date(&s)?)),
    }
}

pub fn run(db_path: &Path, selector: Option<&str>, format: Format) -> Result<()> {
    let view = view_for(selector)?;
    let repo = Repo::open(db_path)?;
    let store = repo.tasks();
    let tasks = match view {
        ListView::Pending => store.list_pending(DEFAULT_OWNER)?,
        ListView::ByDate(date) => store.list_by_date(DEFAULT_OWNER, date)?,
        ListView::All => store.list_all(DEFAULT_OWNER)?,
    };

    repo.listing().replace(&output::listing_labels(&tasks))?;
    debug!("event=cli_list view={view:?} count={}", tasks.len());
    output::print_listing(view, &tasks, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn selector_defaults_to_pending() {
        assert_eq!(view_for(None).unwrap(), ListView::Pending);
        assert_eq!(view_for(Some("Pending")).unwrap(), ListView::Pending);
        assert_eq!(view_for(Some("all")).unwrap(), ListView::All);
    }

    #[test]
    fn selector_accepts_dates() {
        assert_eq!(
            view_for(Some("2024-02-29")).unwrap(),
            ListView::ByDate(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(view_for(Some("soon")).unwrap_err().code(), "invalid_date");
    }
}
