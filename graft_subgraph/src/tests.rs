#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use graft_common::{Config, DedupeMode, logging::setup_test_logging};
    use graft_graph::{Graph, NodeData, NodeId, TypeHierarchy};
    use itertools::Itertools;
    use quickcheck::quickcheck;
    use rstest::rstest;

    use crate::{Embedding, SubgraphMatcher};

    lazy_static::lazy_static! {
        static ref HIERARCHY: TypeHierarchy = {
            let mut h = TypeHierarchy::new();
            h.declare_root("Op").unwrap();
            h.declare("Add", ["Op"]).unwrap();
            h.declare("AddC", ["Add"]).unwrap();
            h.declare("Mul", ["Op"]).unwrap();
            h.declare_root("Const").unwrap();
            h.declare_root("Print").unwrap();
            h.declare_root("A").unwrap();
            h.declare("B", ["A"]).unwrap();
            h
        };
        static ref NO_DEDUPE: Config = Config::builder().no_dedupe().build();
    }

    fn graph(nodes: &[(usize, &str)], edges: &[(usize, usize, &str, &str)]) -> Graph {
        let mut g = Graph::new();
        for &(id, ty) in nodes {
            g.add_node(NodeId(id), NodeData::new(ty)).unwrap();
        }
        for &(s, d, o, i) in edges {
            g.add_edge(NodeId(s), NodeId(d), o, i).unwrap();
        }
        g
    }

    fn search(skeleton: &Graph, host: &Graph, config: &Config) -> Vec<Embedding> {
        setup_test_logging();
        SubgraphMatcher::enumerate_all(skeleton, host, &HIERARCHY, config)
    }

    fn add_chain() -> Graph {
        graph(
            &[(1, "Const"), (2, "Add"), (3, "Print")],
            &[(1, 2, "val", "lhs"), (2, 3, "res", "x")],
        )
    }

    #[test]
    fn finds_the_add_node() {
        let skeleton = graph(&[(0, "Add")], &[]);
        let found = search(&skeleton, &add_chain(), &Config::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].host_of(NodeId(0)), Some(NodeId(2)));
    }

    #[rstest]
    #[case("Mul", "Add", 0)]
    #[case("Add", "Add", 1)]
    #[case("AddC", "Add", 1)]
    #[case("Op", "Add", 0)]
    #[case("Add", "Op", 1)]
    fn type_compatibility_is_one_way(
        #[case] host_ty: &str,
        #[case] pattern_ty: &str,
        #[case] expected: usize,
    ) {
        let host = graph(&[(1, host_ty)], &[]);
        let skeleton = graph(&[(0, pattern_ty)], &[]);
        assert_eq!(search(&skeleton, &host, &Config::default()).len(), expected);
    }

    #[rstest]
    #[case("val", "lhs", 1)]
    #[case("val", "rhs", 0)]
    #[case("out", "lhs", 0)]
    fn ports_must_match_exactly(#[case] out: &str, #[case] inp: &str, #[case] expected: usize) {
        let skeleton = graph(&[(0, "Const"), (1, "Add")], &[(0, 1, out, inp)]);
        assert_eq!(
            search(&skeleton, &add_chain(), &Config::default()).len(),
            expected
        );
    }

    #[test]
    fn direction_matters() {
        let skeleton = graph(&[(0, "Const"), (1, "Add")], &[(1, 0, "val", "lhs")]);
        assert!(search(&skeleton, &add_chain(), &Config::default()).is_empty());
    }

    #[test]
    fn parallel_skeleton_edges_need_distinct_host_edges() {
        let skeleton = graph(
            &[(0, "Const"), (1, "Add")],
            &[(0, 1, "val", "x"), (0, 1, "val", "x")],
        );
        let one = graph(&[(5, "Const"), (6, "Add")], &[(5, 6, "val", "x")]);
        assert!(search(&skeleton, &one, &Config::default()).is_empty());

        let two = graph(
            &[(5, "Const"), (6, "Add")],
            &[(5, 6, "val", "x"), (5, 6, "val", "x")],
        );
        let found = search(&skeleton, &two, &Config::default());
        assert_eq!(found.len(), 1);
        let host_edges: HashSet<_> = found[0].edge_pairs().map(|(_, h)| h).collect();
        assert_eq!(host_edges.len(), 2);
    }

    #[test]
    fn self_loops_are_matched() {
        let skeleton = graph(&[(0, "A")], &[(0, 0, "o", "i")]);
        let host = graph(&[(1, "A"), (2, "A")], &[(2, 2, "o", "i"), (1, 2, "o", "i")]);
        let found = search(&skeleton, &host, &Config::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].host_of(NodeId(0)), Some(NodeId(2)));
    }

    #[test]
    fn overlapping_embeddings_are_all_reported() {
        let host = graph(
            &[(1, "A"), (2, "A"), (3, "A")],
            &[(1, 2, "o", "i"), (2, 3, "o", "i")],
        );
        let skeleton = graph(&[(0, "A"), (1, "A")], &[(0, 1, "o", "i")]);
        let found = search(&skeleton, &host, &Config::default());
        assert_eq!(found.len(), 2);
        assert!(!found[0].is_disjoint(&found[1]));
    }

    #[rstest]
    #[case(DedupeMode::None, 6)]
    #[case(DedupeMode::Full, 6)]
    #[case(DedupeMode::NodeSet, 3)]
    fn dedupe_modes(#[case] mode: DedupeMode, #[case] expected: usize) {
        let host = graph(&[(1, "A"), (2, "A"), (3, "A")], &[]);
        let skeleton = graph(&[(0, "A"), (1, "A")], &[]);
        let cfg = Config::builder().dedupe(mode).build();
        assert_eq!(search(&skeleton, &host, &cfg).len(), expected);
    }

    #[test]
    fn searches_are_restartable_and_lazy() {
        let host = graph(&[(1, "A"), (2, "B"), (3, "A")], &[]);
        let skeleton = graph(&[(0, "A"), (1, "A")], &[]);
        let matcher = SubgraphMatcher::new(&skeleton, &host, &HIERARCHY, &NO_DEDUPE);

        let first: Vec<_> = matcher.embeddings().collect();
        let second: Vec<_> = matcher.embeddings().collect();
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);

        let mut lazy = matcher.embeddings();
        let head = lazy.next().unwrap();
        assert_eq!(lazy.emitted(), 1);
        assert_eq!(head, first[0]);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 2)]
    #[case(5, 3)]
    fn embedding_limit_stops_search(#[case] limit: usize, #[case] expected: usize) {
        let host = graph(&[(1, "A"), (2, "A"), (3, "A")], &[]);
        let skeleton = graph(&[(0, "A")], &[]);
        let cfg = Config::builder().max_embeddings(limit).build();
        assert_eq!(search(&skeleton, &host, &cfg).len(), expected);
    }

    #[test]
    fn empty_skeleton_has_no_embeddings() {
        let skeleton = Graph::new();
        assert!(search(&skeleton, &add_chain(), &Config::default()).is_empty());
    }

    #[test]
    fn no_match_stays_no_match() {
        let skeleton = graph(&[(0, "Mul")], &[]);
        let host = add_chain();
        let matcher = SubgraphMatcher::new(&skeleton, &host, &HIERARCHY, &NO_DEDUPE);
        assert_eq!(matcher.embeddings().count(), 0);
        assert_eq!(matcher.embeddings().count(), 0);
    }

    // ---- properties over small random graphs ----

    const TYPES: [&str; 2] = ["A", "B"];
    const PORTS: [&str; 2] = ["p", "q"];

    fn random_graph(nodes: &[bool], edges: &[(u8, u8, bool, bool)], cap: usize) -> Graph {
        let mut g = Graph::new();
        let n = nodes.len().clamp(1, cap);
        for (i, &b) in nodes.iter().chain(std::iter::repeat(&false)).take(n).enumerate() {
            g.add_node(NodeId(i), NodeData::new(TYPES[usize::from(b)]))
                .unwrap();
        }
        for &(s, d, o, i) in edges.iter().take(2 * cap) {
            g.add_edge(
                NodeId(usize::from(s) % n),
                NodeId(usize::from(d) % n),
                PORTS[usize::from(o)],
                PORTS[usize::from(i)],
            )
            .unwrap();
        }
        g
    }

    /// Count of skeleton edges `a -> b` with given ports.
    fn port_count(g: &Graph, a: NodeId, b: NodeId, out: &str, inp: &str) -> usize {
        g.edges_between(a, b).filter(|(_, e)| e.has_ports(out, inp)).count()
    }

    /// Exhaustive count of injective, type- and port-compatible maps.
    fn brute_force(skeleton: &Graph, host: &Graph) -> usize {
        let p_ids: Vec<NodeId> = skeleton.node_ids().collect();
        let h_ids: Vec<NodeId> = host.node_ids().collect();
        h_ids
            .iter()
            .copied()
            .permutations(p_ids.len())
            .filter(|image| {
                p_ids.iter().zip(image).all(|(&p, &h)| {
                    HIERARCHY.compatible(&host.node(h).unwrap().ty, &skeleton.node(p).unwrap().ty)
                })
            })
            .filter(|image| {
                let at = |p: NodeId| image[p_ids.iter().position(|&x| x == p).unwrap()];
                skeleton.edges().all(|(_, e)| {
                    port_count(skeleton, e.src, e.dst, &e.out_port, &e.in_port)
                        <= port_count(host, at(e.src), at(e.dst), &e.out_port, &e.in_port)
                })
            })
            .count()
    }

    fn embedding_is_valid(skeleton: &Graph, host: &Graph, emb: &Embedding) -> bool {
        let nodes_ok = skeleton.node_ids().all(|p| {
            emb.host_of(p).is_some_and(|h| {
                HIERARCHY.compatible(&host.node(h).unwrap().ty, &skeleton.node(p).unwrap().ty)
            })
        });
        let distinct_nodes = emb.host_nodes().collect::<HashSet<_>>().len() == skeleton.node_count();

        let host_edges: Vec<_> = emb.edge_pairs().map(|(_, h)| h).collect();
        let distinct_edges = host_edges.iter().collect::<HashSet<_>>().len() == host_edges.len();
        let edges_ok = skeleton.edges().all(|(p_edge, e)| {
            emb.host_edge(p_edge).is_some_and(|h_edge| {
                let he = host.edge(h_edge).unwrap();
                Some(he.src) == emb.host_of(e.src)
                    && Some(he.dst) == emb.host_of(e.dst)
                    && he.has_ports(&e.out_port, &e.in_port)
            })
        });

        nodes_ok && distinct_nodes && distinct_edges && edges_ok
    }

    quickcheck! {
        fn every_embedding_is_valid(
            h_nodes: Vec<bool>,
            h_edges: Vec<(u8, u8, bool, bool)>,
            p_nodes: Vec<bool>,
            p_edges: Vec<(u8, u8, bool, bool)>
        ) -> bool {
            let host = random_graph(&h_nodes, &h_edges, 6);
            let skeleton = random_graph(&p_nodes, &p_edges, 3);
            let found = search(&skeleton, &host, &NO_DEDUPE);
            found.iter().all(|e| embedding_is_valid(&skeleton, &host, e))
        }

        fn matches_exhaustive_enumeration(
            h_nodes: Vec<bool>,
            h_edges: Vec<(u8, u8, bool, bool)>,
            p_nodes: Vec<bool>,
            p_edges: Vec<(u8, u8, bool, bool)>
        ) -> bool {
            let host = random_graph(&h_nodes, &h_edges, 5);
            let skeleton = random_graph(&p_nodes, &p_edges, 3);
            search(&skeleton, &host, &NO_DEDUPE).len() == brute_force(&skeleton, &host)
        }

        fn repeated_search_is_identical(
            h_nodes: Vec<bool>,
            h_edges: Vec<(u8, u8, bool, bool)>,
            p_nodes: Vec<bool>,
            p_edges: Vec<(u8, u8, bool, bool)>
        ) -> bool {
            let host = random_graph(&h_nodes, &h_edges, 6);
            let skeleton = random_graph(&p_nodes, &p_edges, 3);
            let matcher = SubgraphMatcher::new(&skeleton, &host, &HIERARCHY, &NO_DEDUPE);
            matcher.embeddings().collect::<Vec<_>>() == matcher.embeddings().collect::<Vec<_>>()
        }
    }
}
