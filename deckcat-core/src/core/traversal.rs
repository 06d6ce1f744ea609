//! Selection state and tree traversal over deck names.
//!
//! The tree is never stored; parent/child relations are derived from the
//! current names on every call, so results always reflect the latest
//! structural mutation.

use crate::core::catalog::{find_deck, find_id_by_key, load_decks};
use crate::core::{meta, name};
use crate::{Catalog, Deck, DeckId, Result, DEFAULT_DECK_ID};
use log::warn;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Immediate children of every deck, keyed by parent id.
pub type ChildMap = BTreeMap<DeckId, BTreeSet<DeckId>>;

impl Catalog {
    /// Makes `deck_id` the current deck.
    ///
    /// The id is not validated; selecting an unknown deck yields an empty
    /// [`active`](Self::active) set. Selection is UI state and is not written
    /// to the change history.
    pub fn select(&mut self, deck_id: DeckId) -> Result<()> {
        meta::set_config_long(self.connection(), meta::CURRENT_DECK, deck_id)
    }

    /// Returns the current deck id, or the default deck if none is stored.
    pub fn selected(&self) -> Result<DeckId> {
        Ok(meta::get_config_long(self.connection(), meta::CURRENT_DECK)?.unwrap_or(DEFAULT_DECK_ID))
    }

    /// Returns the selected deck followed by all of its descendants in id order.
    ///
    /// Empty if the selected deck does not exist.
    pub fn active(&self) -> Result<Vec<DeckId>> {
        let selected = self.selected()?;
        if find_deck(self.connection(), selected)?.is_none() {
            return Ok(Vec::new());
        }
        let mut active = vec![selected];
        active.extend(self.descendants(selected)?);
        Ok(active)
    }

    /// Returns the ids of every deck below `deck_id`, in id order.
    ///
    /// Empty if `deck_id` does not exist.
    pub fn descendants(&self, deck_id: DeckId) -> Result<Vec<DeckId>> {
        let decks = load_decks(self.connection())?;
        let Some(root) = decks.iter().find(|d| d.id == deck_id) else {
            return Ok(Vec::new());
        };
        let root_key = root.key();
        Ok(decks
            .iter()
            .filter(|d| name::is_descendant_key(&d.key(), &root_key))
            .map(|d| d.id)
            .collect())
    }

    /// Returns the ancestors of `deck_id`, root-most first.
    ///
    /// Ancestors missing from the catalog are skipped, so a broken chain
    /// yields a partial result. Unknown ids yield an empty result.
    pub fn parents(&self, deck_id: DeckId) -> Result<Vec<Deck>> {
        match find_deck(self.connection(), deck_id)? {
            Some(deck) => self.parents_by_name(&deck.name),
            None => Ok(Vec::new()),
        }
    }

    /// Returns the existing ancestors of `name`, root-most first.
    ///
    /// `name` does not need to exist itself.
    pub fn parents_by_name(&self, name: &str) -> Result<Vec<Deck>> {
        let conn = self.connection();
        let mut parents = Vec::new();
        for ancestor in name::ancestors(&name::strip(name)) {
            let found = match find_id_by_key(conn, &ancestor.to_lowercase())? {
                Some(id) => find_deck(conn, id)?,
                None => None,
            };
            match found {
                Some(deck) => parents.push(deck),
                None => warn!("broken ancestor chain: '{ancestor}' missing above '{name}'"),
            }
        }
        Ok(parents)
    }

    /// Groups every deck under its immediate parent.
    ///
    /// Every deck appears as a key, leaves with an empty set. A deck whose
    /// parent is missing is not listed under any parent.
    pub fn child_map(&self) -> Result<ChildMap> {
        let decks = load_decks(self.connection())?;
        let mut by_key: HashMap<String, DeckId> = HashMap::with_capacity(decks.len());
        for deck in &decks {
            by_key.entry(deck.key()).or_insert(deck.id);
        }

        let mut map: ChildMap = decks.iter().map(|d| (d.id, BTreeSet::new())).collect();
        for deck in &decks {
            let Some(parent) = name::immediate_parent(&deck.key()) else {
                continue;
            };
            match by_key.get(&parent) {
                Some(parent_id) => {
                    map.entry(*parent_id).or_default().insert(deck.id);
                }
                None => warn!("deck {} '{}' has no parent in the catalog", deck.id, deck.name),
            }
        }
        Ok(map)
    }

    /// Returns the immediate children of `deck_id` as `(name, id)`, sorted by name.
    pub fn children(&self, deck_id: DeckId) -> Result<Vec<(String, DeckId)>> {
        let decks = load_decks(self.connection())?;
        let Some(parent) = decks.iter().find(|d| d.id == deck_id) else {
            return Ok(Vec::new());
        };
        let parent_key = parent.key();
        let mut children: Vec<(String, DeckId)> = decks
            .iter()
            .filter(|d| name::immediate_parent(&d.key()).as_deref() == Some(parent_key.as_str()))
            .map(|d| (d.name.clone(), d.id))
            .collect();
        children.sort();
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Catalog, DEFAULT_DECK_ID};
    use tempfile::NamedTempFile;

    fn new_catalog() -> (Catalog, NamedTempFile) {
        let temp = NamedTempFile::new().unwrap();
        let catalog = Catalog::create(temp.path()).unwrap();
        (catalog, temp)
    }

    #[test]
    fn test_basic_selection_scenario() {
        let (mut catalog, _temp) = new_catalog();
        assert_eq!(catalog.all_sorted_names().unwrap().len(), 1);

        let parent_id = catalog.get_or_create_by_name("new deck").unwrap();
        assert_eq!(catalog.all_sorted_names().unwrap().len(), 2);
        assert_eq!(catalog.get_or_create_by_name("new deck").unwrap(), parent_id);

        // The default deck starts out selected.
        assert_eq!(catalog.selected().unwrap(), DEFAULT_DECK_ID);
        assert_eq!(catalog.active().unwrap(), vec![DEFAULT_DECK_ID]);

        catalog.select(parent_id).unwrap();
        assert_eq!(catalog.selected().unwrap(), parent_id);
        assert_eq!(catalog.active().unwrap(), vec![parent_id]);

        let child_id = catalog.get_or_create_by_name("new deck::child").unwrap();
        assert_eq!(catalog.selected().unwrap(), parent_id);
        assert_eq!(catalog.active().unwrap(), vec![parent_id, child_id]);

        catalog.select(child_id).unwrap();
        assert_eq!(catalog.selected().unwrap(), child_id);
        assert_eq!(catalog.active().unwrap(), vec![child_id]);
    }

    #[test]
    fn test_selection_persists_as_long() {
        let temp = NamedTempFile::new().unwrap();
        let id = {
            let mut catalog = Catalog::create(temp.path()).unwrap();
            let id = catalog.get_or_create_by_name("test").unwrap();
            catalog.select(id).unwrap();
            id
        };

        let catalog = Catalog::open(temp.path()).unwrap();
        assert_eq!(catalog.selected().unwrap(), id);
        let stored = crate::core::meta::get_config_long(catalog.connection(), "curDeck").unwrap();
        assert_eq!(stored, Some(id));
    }

    #[test]
    fn test_selected_coerces_string_value() {
        let (mut catalog, _temp) = new_catalog();
        let parent_id = catalog.get_or_create_by_name("parent").unwrap();
        let child_id = catalog.get_or_create_by_name("parent::child").unwrap();
        catalog
            .connection()
            .execute(
                "UPDATE catalog_meta SET value = ?1 WHERE key = 'curDeck'",
                [format!("\"{parent_id}\"")],
            )
            .unwrap();

        assert_eq!(catalog.selected().unwrap(), parent_id);
        assert_eq!(catalog.active().unwrap(), vec![parent_id, child_id]);
    }

    #[test]
    fn test_selecting_unknown_deck_gives_empty_active_set() {
        let (mut catalog, _temp) = new_catalog();
        catalog.select(987_654).unwrap();
        assert_eq!(catalog.selected().unwrap(), 987_654);
        assert!(catalog.active().unwrap().is_empty());
    }

    #[test]
    fn test_active_is_recomputed_after_rename() {
        let (mut catalog, _temp) = new_catalog();
        let a = catalog.get_or_create_by_name("a").unwrap();
        let b = catalog.get_or_create_by_name("b").unwrap();
        catalog.select(a).unwrap();
        assert_eq!(catalog.active().unwrap(), vec![a]);

        catalog.rename(b, "a::b").unwrap();
        assert_eq!(catalog.active().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_parents_root_most_first() {
        let (mut catalog, _temp) = new_catalog();
        let leaf = catalog.get_or_create_by_name("x::y::z").unwrap();

        let names: Vec<String> = catalog.parents(leaf).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["x".to_string(), "x::y".to_string()]);
        assert!(catalog.parents(DEFAULT_DECK_ID).unwrap().is_empty());
        assert!(catalog.parents(31_337).unwrap().is_empty());
    }

    #[test]
    fn test_parents_tolerates_broken_chain() {
        let (mut catalog, _temp) = new_catalog();
        let leaf = catalog.get_or_create_by_name("x::y::z").unwrap();
        let middle = catalog.id_for_name("x::y").unwrap().unwrap();
        catalog
            .connection()
            .execute("DELETE FROM decks WHERE id = ?", [middle])
            .unwrap();

        let names: Vec<String> = catalog.parents(leaf).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["x".to_string()]);
    }

    #[test]
    fn test_parents_with_changed_case_still_resolve() {
        let test_decks = [
            "scxipjiyozczaaczoawo",
            "cmxieunwoogyxsctnjmv::abcdefgh::ZYXW",
            "cmxieunwoogyxsctnjmv::INSBGDS",
            "::foobar",
            "A::",
        ];
        let (mut catalog, _temp) = new_catalog();
        for name in test_decks {
            catalog.get_or_create_by_name(name).unwrap();
        }
        let mut broken = catalog.by_name("cmxieunwoogyxsctnjmv::INSBGDS").unwrap().unwrap();
        broken.name = "CMXIEUNWOOGYXSCTNJMV::INSBGDS".to_string();
        catalog.save(&broken).unwrap();

        catalog.child_map().unwrap();
        for deck in catalog.all().unwrap() {
            let expected = crate::ancestors(&deck.name).len();
            assert_eq!(catalog.parents(deck.id).unwrap().len(), expected, "deck {}", deck.name);
        }
    }

    #[test]
    fn test_child_map_groups_by_immediate_parent() {
        let (mut catalog, _temp) = new_catalog();
        let grandchild = catalog.get_or_create_by_name("p::c1::g").unwrap();
        let p = catalog.id_for_name("p").unwrap().unwrap();
        let c1 = catalog.id_for_name("p::c1").unwrap().unwrap();
        let c2 = catalog.get_or_create_by_name("P::c2").unwrap();

        let map = catalog.child_map().unwrap();
        assert_eq!(map[&p].iter().copied().collect::<Vec<_>>(), vec![c1, c2]);
        assert_eq!(map[&c1].iter().copied().collect::<Vec<_>>(), vec![grandchild]);
        assert!(map[&grandchild].is_empty());
        assert!(map[&DEFAULT_DECK_ID].is_empty());
    }

    #[test]
    fn test_children_sorted_by_name() {
        let (mut catalog, _temp) = new_catalog();
        let zed = catalog.get_or_create_by_name("root::zed").unwrap();
        let alpha = catalog.get_or_create_by_name("root::alpha").unwrap();
        catalog.get_or_create_by_name("root::alpha::deep").unwrap();
        let root = catalog.id_for_name("root").unwrap().unwrap();

        assert_eq!(
            catalog.children(root).unwrap(),
            vec![("root::alpha".to_string(), alpha), ("root::zed".to_string(), zed)]
        );
        assert!(catalog.children(zed).unwrap().is_empty());
    }

    #[test]
    fn test_descendants_match_whole_segments() {
        let (mut catalog, _temp) = new_catalog();
        let a = catalog.get_or_create_by_name("a").unwrap();
        let ab = catalog.get_or_create_by_name("a::b").unwrap();
        catalog.get_or_create_by_name("ab").unwrap();

        assert_eq!(catalog.descendants(a).unwrap(), vec![ab]);
    }
}
