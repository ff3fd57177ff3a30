//! Branch lookup by loosely written name.

use uuid::Uuid;

use super::arabic::normalize;
use crate::domain::Branch;

/// Matches free-text branch names against known branches.
///
/// Exact normalized equality wins; otherwise the first branch (in name
/// order) whose key contains the query, or is contained by it.
pub struct BranchMatcher {
    entries: Vec<(String, Uuid, String)>,
}

impl BranchMatcher {
    pub fn new(branches: &[Branch]) -> Self {
        let mut entries: Vec<(String, Uuid, String)> = branches
            .iter()
            .map(|b| (normalize(&b.name), b.id, b.name.clone()))
            .filter(|(key, _, _)| !key.is_empty())
            .collect();
        entries.sort_by(|a, b| a.2.cmp(&b.2));
        Self { entries }
    }

    /// Register a branch created during the same import run.
    pub fn insert(&mut self, id: Uuid, name: &str) {
        let key = normalize(name);
        if key.is_empty() {
            return;
        }
        let pos = self
            .entries
            .iter()
            .position(|(_, _, existing)| existing.as_str() > name)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, (key, id, name.to_string()));
    }

    /// Id of the best match for `query`, if any.
    pub fn find(&self, query: &str) -> Option<Uuid> {
        let key = normalize(query);
        if key.is_empty() {
            return None;
        }

        if let Some((_, id, _)) = self.entries.iter().find(|(k, _, _)| *k == key) {
            return Some(*id);
        }

        self.entries
            .iter()
            .find(|(k, _, _)| k.contains(&key) || key.contains(k.as_str()))
            .map(|(_, id, _)| *id)
    }

    /// Exact normalized match only.
    pub fn find_exact(&self, query: &str) -> Option<Uuid> {
        let key = normalize(query);
        self.entries
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBranch;

    fn branch(name: &str) -> Branch {
        Branch::new(NewBranch {
            name: name.into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_exact_beats_containment() {
        let short = branch("فرع العليا");
        let long = branch("فرع العليا الشمالي");
        let matcher = BranchMatcher::new(&[long.clone(), short.clone()]);

        assert_eq!(matcher.find("فرع العليا"), Some(short.id));
        assert_eq!(matcher.find("فَرع العُليا"), Some(short.id));
    }

    #[test]
    fn test_containment_either_direction() {
        let olaya = branch("فرع العليا");
        let malaz = branch("فرع الملز");
        let matcher = BranchMatcher::new(&[olaya.clone(), malaz.clone()]);

        // Query contains the branch name.
        assert_eq!(matcher.find("مطعم فرع الملز - الرياض"), Some(malaz.id));
        // Branch name contains the query.
        assert_eq!(matcher.find("العليا"), Some(olaya.id));
        assert_eq!(matcher.find("جدة"), None);
        assert_eq!(matcher.find("   "), None);
    }

    #[test]
    fn test_first_in_name_order_wins() {
        let a = branch("الحمراء ١");
        let b = branch("الحمراء ٢");
        let matcher = BranchMatcher::new(&[b.clone(), a.clone()]);
        assert_eq!(matcher.find("الحمراء"), Some(a.id));
    }

    #[test]
    fn test_inserted_branches_are_found() {
        let mut matcher = BranchMatcher::new(&[]);
        let id = Uuid::new_v4();
        matcher.insert(id, "فرع الشاطئ");
        assert_eq!(matcher.find_exact("فرع الشاطي"), Some(id));
    }
}
