use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::modules::folder::{model::FolderNode, schema::FolderEntity};

/// Builds a materialized path from the parent's path and a folder name.
pub fn join_path(parent_path: Option<&str>, name: &str) -> String {
    match parent_path {
        None | Some("/") | Some("") => format!("/{name}"),
        Some(parent) => format!("{}/{}", parent.trim_end_matches('/'), name),
    }
}

/// Arena of folders indexed by id with parent -> children links.
///
/// Path rewrites walk the arena by id, so a sibling whose name merely shares a
/// textual prefix with the moved folder is never touched.
#[derive(Debug, Default)]
pub struct FolderTree {
    nodes: HashMap<Uuid, FolderEntity>,
    children: HashMap<Option<Uuid>, Vec<Uuid>>,
}

impl FolderTree {
    pub fn new(folders: Vec<FolderEntity>) -> Self {
        let mut tree = FolderTree::default();
        for folder in folders {
            tree.children.entry(folder.parent_id).or_default().push(folder.id);
            tree.nodes.insert(folder.id, folder);
        }
        tree
    }

    pub fn get(&self, id: &Uuid) -> Option<&FolderEntity> {
        self.nodes.get(id)
    }

    pub fn children_of(&self, parent_id: Option<Uuid>) -> Vec<&FolderEntity> {
        let mut children: Vec<&FolderEntity> = self
            .children
            .get(&parent_id)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
    }

    pub fn has_sibling_named(&self, parent_id: Option<Uuid>, name: &str, except: Option<Uuid>) -> bool {
        self.children_of(parent_id)
            .iter()
            .any(|sibling| sibling.name == name && Some(sibling.id) != except)
    }

    /// All descendants of `id` (not including `id`), breadth first.
    pub fn descendants(&self, id: &Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from([*id]);
        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.get(&Some(current)) {
                for kid in kids {
                    out.push(*kid);
                    queue.push_back(*kid);
                }
            }
        }
        out
    }

    /// True when `candidate` is `ancestor` itself or sits anywhere below it.
    pub fn is_self_or_descendant(&self, ancestor: &Uuid, candidate: &Uuid) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = Some(*candidate);
        while let Some(id) = cursor {
            if id == *ancestor {
                return true;
            }
            if !seen.insert(id) {
                break;
            }
            cursor = self.nodes.get(&id).and_then(|f| f.parent_id);
        }
        false
    }

    pub fn path_under(&self, parent_id: Option<Uuid>, name: &str) -> String {
        let parent_path = parent_id.and_then(|pid| self.nodes.get(&pid)).map(|p| p.path.as_str());
        join_path(parent_path, name)
    }

    /// Applies a new name/parent to `id` and re-derives the path of the folder and of
    /// every descendant. Returns the rewritten rows, the relocated folder first.
    pub fn relocate(
        &mut self,
        id: &Uuid,
        name: String,
        parent_id: Option<Uuid>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Vec<FolderEntity> {
        let Some(old_parent) = self.nodes.get(id).map(|f| f.parent_id) else {
            return Vec::new();
        };

        if old_parent != parent_id {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.retain(|sibling| sibling != id);
            }
            self.children.entry(parent_id).or_default().push(*id);
        }

        let path = self.path_under(parent_id, &name);
        if let Some(folder) = self.nodes.get_mut(id) {
            folder.name = name;
            folder.parent_id = parent_id;
            folder.path = path;
            folder.updated_at = now;
        }

        let mut changed = Vec::new();
        if let Some(folder) = self.nodes.get(id) {
            changed.push(folder.clone());
        }

        let mut queue = VecDeque::from([*id]);
        while let Some(current) = queue.pop_front() {
            let parent_path = match self.nodes.get(&current) {
                Some(f) => f.path.clone(),
                None => continue,
            };
            let kids = self.children.get(&Some(current)).cloned().unwrap_or_default();
            for kid in kids {
                if let Some(child) = self.nodes.get_mut(&kid) {
                    child.path = join_path(Some(&parent_path), &child.name);
                    child.updated_at = now;
                    changed.push(child.clone());
                }
                queue.push_back(kid);
            }
        }

        changed
    }

    pub fn nested(&self) -> Vec<FolderNode> {
        self.nested_under(None)
    }

    fn nested_under(&self, parent_id: Option<Uuid>) -> Vec<FolderNode> {
        self.children_of(parent_id)
            .into_iter()
            .map(|folder| {
                let mut node = FolderNode::from(folder);
                node.children = self.nested_under(Some(folder.id));
                node
            })
            .collect()
    }
}
