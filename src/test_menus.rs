//! Shared menu fixtures for the unit tests.

use itertools::Itertools;

use crate::Hierarchy;

pub const ROOT_PID: i32 = -1;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Menu {
    pub id: i32,
    pub name: String,
    pub pid: i32,
    pub sort: i32,
    pub children: Vec<Menu>,
}

pub fn menu(id: i32, pid: i32, sort: i32) -> Menu {
    Menu {
        id,
        name: format!("menu-{id}"),
        pid,
        sort,
        children: Vec::new(),
    }
}

/// Four elements below `-1`: `1` holds `2` and `3`, and `2` holds `4`.
pub fn small_menus() -> Vec<Menu> {
    vec![menu(1, -1, 1), menu(2, 1, 2), menu(3, 1, 3), menu(4, 2, 4)]
}

/// Eight elements, four levels deep, with `sort` keys out of id order.
pub fn default_menus() -> Vec<Menu> {
    vec![
        menu(1, -1, 1),
        menu(2, 1, 99),
        menu(3, 2, 1),
        menu(4, 2, 22),
        menu(5, 2, 5),
        menu(6, 1, 98),
        menu(7, 1, 92),
        menu(8, 3, 91),
    ]
}

pub fn by_sort(a: &Menu, b: &Menu) -> std::cmp::Ordering {
    a.sort.cmp(&b.sort)
}

/// The usual accessors for [`Menu`], rooted at `root`.
pub fn menu_hierarchy(root: i32) -> Hierarchy<Menu, i32> {
    Hierarchy::new()
        .id(|m: &Menu| m.id)
        .parent_id(|m: &Menu| m.pid)
        .root(move |v: &i32| *v == root)
        .set_children(|m: &mut Menu, children| m.children = children)
}

/// Renders a forest of menus as `id[children]`, e.g. `1[2[4],3]`.
pub fn shape(menus: &[Menu]) -> String {
    menus
        .iter()
        .map(|m| {
            if m.children.is_empty() {
                m.id.to_string()
            } else {
                format!("{}[{}]", m.id, shape(&m.children))
            }
        })
        .join(",")
}

pub fn ids(menus: &[Menu]) -> Vec<i32> {
    menus.iter().map(|m| m.id).collect()
}
