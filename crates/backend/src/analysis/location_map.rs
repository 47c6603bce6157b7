use crate::artifact::Micheline;

/// Location-indexed view of a compiled contract.
///
/// Locations are assigned by a pre-order traversal starting at 0: a node gets its location
/// before any of its children, and children (the arguments of a primitive application or
/// the elements of a sequence) are numbered left to right. This is the numbering the
/// interpreter reports in `location: N` trace headers, so any divergence here makes every
/// lookup return the wrong node.
#[derive(Clone, Debug, Default)]
pub struct LocationMap<'a> {
    nodes: Vec<&'a Micheline>,
}

impl<'a> LocationMap<'a> {
    pub fn build(root: &'a Micheline) -> Self {
        let mut nodes = vec![];
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend(node.children().iter().rev());
        }
        trace!("built location map with {} node(s)", nodes.len());
        Self { nodes }
    }

    pub fn get(&self, location: usize) -> Option<&'a Micheline> {
        self.nodes.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates `(location, node)` pairs in location order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Micheline)> + '_ {
        self.nodes.iter().copied().enumerate()
    }

    /// Locations of the nodes carrying a debug annotation.
    pub fn annotated(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().filter(|(_, node)| node.debug().is_some()).map(|(loc, _)| loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: &str) -> Micheline {
        Micheline::Int { int: v.to_string() }
    }

    #[test]
    fn test_preorder_numbering() {
        // { parameter nat ; code { PUSH nat 2 ; DROP } }
        let root = Micheline::Seq(vec![
            Micheline::prim("parameter", vec![Micheline::prim("nat", vec![])]),
            Micheline::prim(
                "code",
                vec![Micheline::Seq(vec![
                    Micheline::prim("PUSH", vec![Micheline::prim("nat", vec![]), int("2")]),
                    Micheline::prim("DROP", vec![]),
                ])],
            ),
        ]);
        let map = LocationMap::build(&root);

        let labels: Vec<_> = map.iter().map(|(_, node)| node.label()).collect();
        assert_eq!(
            labels,
            vec!["{ ... }", "parameter", "nat", "code", "{ ... }", "PUSH", "nat", "2", "DROP"]
        );
        assert_eq!(map.len(), 9);
        assert_eq!(map.get(5).map(Micheline::label), Some("PUSH"));
        assert!(map.get(9).is_none());
    }

    #[test]
    fn test_single_leaf() {
        let root = int("1");
        let map = LocationMap::build(&root);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(0), Some(&root));
        assert_eq!(map.annotated().count(), 0);
    }

    #[test]
    fn test_deep_nesting() {
        let mut root = int("0");
        for _ in 0..100_000 {
            root = Micheline::Seq(vec![root]);
        }
        let map = LocationMap::build(&root);
        assert_eq!(map.len(), 100_001);
        assert_eq!(map.get(100_000).map(Micheline::label), Some("0"));

        // dropping a deeply nested tree recurses, so unwind it by hand
        let mut node = root;
        while let Micheline::Seq(mut items) = node {
            match items.pop() {
                Some(next) => node = next,
                None => break,
            }
        }
    }

    #[test]
    fn test_fixture_locations() {
        let content = std::fs::read_to_string(crate::testdata("debug.json")).unwrap();
        let data = crate::artifact::DebugData::from_json(&content).unwrap();
        let map = data.location_map();

        assert_eq!(map.get(7).map(Micheline::label), Some("CDR"));
        assert_eq!(map.get(12).map(Micheline::label), Some("DIP"));
        assert_eq!(map.get(23).map(Micheline::label), Some("PAIR"));
        assert_eq!(map.annotated().collect::<Vec<_>>(), vec![7, 8, 12, 19]);
    }
}
