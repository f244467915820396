use geas_crypto::{sha256_hex, strip_tag};
use std::collections::BTreeMap;

/// Merkle root over `files` (path to content hash), as bare hex.
///
/// Leaves are the untagged hex hashes in path order. Parents hash the hex
/// text of left and right concatenated; an odd node pairs with itself. No
/// files gives the hash of the empty string, one file gives its own hash.
pub fn merkle_root(files: &BTreeMap<String, String>) -> String {
    let mut level: Vec<String> = files
        .values()
        .map(|hash| strip_tag(hash).to_string())
        .collect();
    if level.is_empty() {
        return sha256_hex(b"");
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                sha256_hex(format!("{left}{right}").as_bytes())
            })
            .collect();
    }
    level.swap_remove(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn h(s: &str) -> String {
        sha256_hex(s.as_bytes())
    }

    fn files(entries: &[(&str, String)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(p, hash)| (p.to_string(), hash.clone()))
            .collect()
    }

    #[test]
    fn three_leaves_duplicate_the_last() {
        let (h1, h2, h3) = (h("A"), h("B"), h("C"));
        let expected = h(&format!("{}{}", h(&format!("{h1}{h2}")), h(&format!("{h3}{h3}"))));
        let tree = files(&[("c.txt", h3.clone()), ("a.txt", h1.clone()), ("b.txt", h2.clone())]);
        assert_eq!(merkle_root(&tree), expected);
    }

    #[test]
    fn tagged_and_bare_leaves_agree() {
        let bare = files(&[("a", h("A")), ("b", h("B"))]);
        let tagged = files(&[("a", format!("sha256:{}", h("A"))), ("b", format!("sha256:{}", h("B")))]);
        assert_eq!(merkle_root(&bare), merkle_root(&tagged));
    }

    #[test]
    fn degenerate_sizes() {
        assert_eq!(merkle_root(&BTreeMap::new()), h(""));
        assert_eq!(merkle_root(&files(&[("only.rs", h("X"))])), h("X"));
    }

    #[test]
    fn rename_changes_root() {
        let a = files(&[("a", h("1")), ("b", h("2"))]);
        let renamed = files(&[("c", h("1")), ("b", h("2"))]);
        assert_ne!(merkle_root(&a), merkle_root(&renamed));
    }

    proptest! {
        #[test]
        fn any_content_change_moves_root(
            contents in proptest::collection::btree_map("[a-z]{1,8}", "[a-z]{0,8}", 1..12),
            pick in any::<prop::sample::Index>(),
        ) {
            let tree: BTreeMap<String, String> =
                contents.iter().map(|(p, c)| (p.clone(), h(c))).collect();
            let key = pick.get(&tree.keys().cloned().collect::<Vec<_>>()).clone();
            let mut changed = tree.clone();
            changed.insert(key.clone(), h(&format!("{}!", contents[&key])));
            prop_assert_ne!(merkle_root(&tree), merkle_root(&changed));
        }

        #[test]
        fn adding_a_file_moves_root(
            contents in proptest::collection::btree_map("[a-z]{1,8}", "[a-z]{0,8}", 0..12),
        ) {
            let tree: BTreeMap<String, String> =
                contents.iter().map(|(p, c)| (p.clone(), h(c))).collect();
            let mut grown = tree.clone();
            grown.insert("zz-new".into(), h("fresh file!"));
            prop_assert_ne!(merkle_root(&tree), merkle_root(&grown));
        }
    }
}
