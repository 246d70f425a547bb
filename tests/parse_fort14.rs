use fort14::{parse_mesh, ParseError, Section};

/// Six-node strip with an open ocean edge and one segment of every land/flow category
const ESTUARY: &str = "\
Estuary test grid ! generated by hand
4 6 ! NE NP
1 -70.00 40.00 12.5
2 -69.99 40.00 10.0
3 -70.00 40.01 3.25
4 -69.99 40.01 -1.0
5 -70.00 40.02 -2.0
6 -69.99 40.02 0.0
1 3 1 2 3
2 3 2 4 3
3 3 3 4 5
4 3 4 6 5
1 = Number of open boundaries
2 = Total number of open boundary nodes
2 = Number of nodes for open boundary 1
1
2
6 = Number of land boundaries
11 = Total number of land boundary nodes
2 20 = Number of nodes for land boundary 1
2
4
1 1
5
2 102
6
5
1 23
3 0.5 1.0
1 24
3 4 1.5 0.6 0.9
1 5
5 6 2.0 0.7 1.1 0.015 0.75
";

fn write_mesh(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fort.14");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn estuary_mesh() {
    let (_dir, path) = write_mesh(ESTUARY);
    let mesh = parse_mesh(&path).unwrap();

    assert_eq!(mesh.description, "Estuary test grid ! generated by hand");
    assert_eq!(mesh.nodes.len(), 6);
    assert_eq!(mesh.elements.len(), 4);
    assert_eq!(mesh.z(), vec![-12.5, -10.0, -3.25, 1.0, 2.0, -0.0]);
    assert_eq!(mesh.elements[3].vertices, [3, 5, 4]);

    for element in &mesh.elements {
        for vertex in element.vertices {
            assert!(vertex < mesh.nodes.len());
        }
        assert!(mesh.element_area(element) > 0.0);
    }

    let boundaries = &mesh.boundaries;
    assert_eq!(boundaries.len(), 7);
    assert_eq!(boundaries.ocean[0].indexes, vec![0, 1]);
    assert_eq!(boundaries.land[0].ibtype, 20);
    assert_eq!(boundaries.land[0].indexes, vec![1, 3]);
    assert_eq!(boundaries.inner[0].indexes, vec![4]);
    assert_eq!(boundaries.inflow[0].indexes, vec![5, 4]);

    let outflow = &boundaries.outflow[0].nodes[0];
    assert_eq!(outflow.index, 2);
    assert_eq!(outflow.barrier_height, 0.5);
    assert_eq!(outflow.supercritical_flow_coefficient, 1.0);

    let weir = &boundaries.weir[0];
    assert_eq!(weir.ibtype, 24);
    assert_eq!(weir.pairs[0].front_face_index, 2);
    assert_eq!(weir.pairs[0].back_face_index, 3);

    let culvert = &boundaries.culvert[0].pairs[0];
    assert_eq!(culvert.front_face_index, 4);
    assert_eq!(culvert.back_face_index, 5);
    assert_eq!(culvert.friction_factor, 0.015);
    assert_eq!(culvert.pipe_diameter, 0.75);
}

#[test]
fn estuary_without_boundaries() {
    let grid: String = ESTUARY.lines().take(12).map(|l| format!("{l}\n")).collect();
    let (_dir, path) = write_mesh(&grid);

    let mesh = parse_mesh(&path).unwrap();
    assert_eq!(mesh.elements.len(), 4);
    assert!(mesh.boundaries.is_empty());
}

#[test]
fn estuary_cut_after_nodes() {
    let grid: String = ESTUARY.lines().take(8).map(|l| format!("{l}\n")).collect();
    let (_dir, path) = write_mesh(&grid);

    match parse_mesh(&path) {
        Err(err @ ParseError::TruncatedInput { .. }) => {
            assert_eq!(err.line(), Some(9));
            assert!(matches!(
                err,
                ParseError::TruncatedInput {
                    section: Section::Elements,
                    remaining: 4,
                    ..
                }
            ));
        }
        other => panic!("expected TruncatedInput, got {:?}", other),
    }
}

#[test]
fn estuary_with_unknown_segment_type() {
    let grid = ESTUARY.replace("1 24\n", "1 14\n");
    let (_dir, path) = write_mesh(&grid);

    assert!(matches!(
        parse_mesh(&path),
        Err(ParseError::UnknownBoundaryType { ibtype: 14, .. })
    ));
}

#[test]
fn windows_line_endings() {
    let grid = ESTUARY.replace('\n', "\r\n");
    let (_dir, path) = write_mesh(&grid);

    let mesh = parse_mesh(&path).unwrap();
    assert_eq!(mesh.description, "Estuary test grid ! generated by hand");
    assert_eq!(mesh.boundaries.len(), 7);
}
