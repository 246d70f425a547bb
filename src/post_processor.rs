use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use json::JsonValue;
use log::info;

use crate::{
    datatypes::{BoundaryKind, Mesh},
    error::ExportError,
};

fn write_csv(
    path: &Path,
    write_rows: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), ExportError> {
    let wrap = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(wrap)?);
    write_rows(&mut writer).map_err(wrap)?;
    writer.flush().map_err(wrap)
}

/// Writes mesh nodes and elements to two CSV files
///
/// # Arguments
/// * `mesh` - A reference to the parsed mesh
/// * `nodes_output` - The path of the output nodes csv (`id,x,y,z`)
/// * `elements_output` - The path of the output elements csv (`id,n0,n1,n2`)
pub fn csv_output(
    mesh: &Mesh,
    nodes_output: &Path,
    elements_output: &Path,
) -> Result<(), ExportError> {
    write_csv(nodes_output, |file| {
        writeln!(file, "id,x,y,z")?;
        for node in &mesh.nodes {
            writeln!(file, "{},{},{},{}", node.id, node.x, node.y, node.z)?;
        }
        Ok(())
    })?;

    write_csv(elements_output, |file| {
        writeln!(file, "id,n0,n1,n2")?;
        for element in &mesh.elements {
            let [n0, n1, n2] = element.vertices;
            writeln!(file, "{},{n0},{n1},{n2}", element.id)?;
        }
        Ok(())
    })?;

    info!(
        "wrote {} nodes to {} and {} elements to {}",
        mesh.nodes.len(),
        nodes_output.display(),
        mesh.elements.len(),
        elements_output.display()
    );

    Ok(())
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn range_json(range: Option<(f64, f64)>) -> JsonValue {
    match range {
        Some((min, max)) => {
            let mut value = JsonValue::new_object();
            value["min"] = min.into();
            value["max"] = max.into();
            value
        }
        None => JsonValue::Null,
    }
}

/// Builds a JSON overview of a mesh
///
/// # Arguments
/// * `mesh` - A reference to the parsed mesh
///
/// # Returns
/// Counts per section and boundary category, coordinate and depth ranges,
/// and element area totals
pub fn summary(mesh: &Mesh) -> JsonValue {
    let mut boundaries = JsonValue::new_object();
    boundaries["ocean"] = mesh.boundaries.ocean.len().into();
    for kind in BoundaryKind::ALL {
        boundaries[kind.name()] = mesh.boundaries.count(kind).into();
    }

    let areas: Vec<f64> = mesh
        .elements
        .iter()
        .map(|element| mesh.element_area(element))
        .collect();

    let mut value = JsonValue::new_object();
    value["description"] = mesh.description.trim().into();
    value["nodes"] = mesh.nodes.len().into();
    value["elements"] = mesh.elements.len().into();
    value["boundaries"] = boundaries;
    value["x"] = range_json(range(mesh.nodes.iter().map(|n| n.x)));
    value["y"] = range_json(range(mesh.nodes.iter().map(|n| n.y)));
    value["z"] = range_json(range(mesh.nodes.iter().map(|n| n.z)));
    value["total_area"] = areas.iter().fold(0.0_f64, |acc, a| acc + a.abs()).into();
    value["clockwise_elements"] = areas.iter().filter(|a| **a <= 0.0).count().into();

    value
}
