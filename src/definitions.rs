//! Definitions index: reverse lookup from node identity to the key under
//! which it appears in a `definitions` table anywhere in the document.
//! Used as a naming fallback when a schema has no `title` or `$id`.

use std::collections::{HashMap, HashSet};

use crate::schema::{SchemaArena, SchemaId};

#[derive(Debug, Default)]
pub struct DefinitionsIndex {
    by_id: HashMap<SchemaId, String>,
}

impl DefinitionsIndex {
    /// Walk the whole document from `root`, collecting every sub-schema
    /// appearing under any `definitions` key, recursively through all
    /// attribute values. Re-entered nodes are skipped, so cyclic
    /// documents terminate. The first key found for a node wins.
    pub fn build(arena: &SchemaArena, root: SchemaId) -> Self {
        let mut index = Self::default();
        let mut visited = HashSet::new();
        index.walk(arena, root, &mut visited);
        index
    }

    /// The definition key for `id`, if the node is a definition.
    pub fn key_for(&self, id: SchemaId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    fn walk(&mut self, arena: &SchemaArena, id: SchemaId, visited: &mut HashSet<SchemaId>) {
        if !visited.insert(id) {
            return;
        }
        let Some(obj) = arena.obj(id) else { return };
        if let Some(defs) = &obj.definitions {
            for (key, def_id) in defs {
                self.by_id.entry(*def_id).or_insert_with(|| key.clone());
            }
        }
        for child in obj.children() {
            self.walk(arena, child, visited);
        }
    }
}
