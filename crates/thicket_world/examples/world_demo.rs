use thicket_core::MeshCollector;
use thicket_world::{
    CellType, PlantConfig, PlantGenerator, PlantKind, StreetConfig, StreetGenerator, UfoConfig, UfoGenerator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Structure Builder Demo ===\n");

    let mut plants = PlantGenerator::new(PlantConfig { count: 4, ..PlantConfig::default() })?;
    println!("Plants:");
    for (i, plant) in plants.regenerate()?.iter().enumerate() {
        let kind = match plant.kind {
            PlantKind::Tree => "tree",
            PlantKind::Bush => "bush",
        };
        println!(
            "  {} {}: {} branches, max order {}, {} discarded",
            kind,
            i,
            plant.branch_count(),
            plant.max_order(),
            plant.stats.discarded
        );
    }
    println!();

    let mut streets = StreetGenerator::new(StreetConfig { seed: 7, texture_size: 64, ..StreetConfig::default() })?;
    let layout = streets.regenerate()?;
    println!("Street grid ({}x{}):", layout.grid.size(), layout.grid.size());
    for z in (0..layout.grid.size()).rev() {
        let row: String = (0..layout.grid.size())
            .map(|x| match layout.grid.get(x, z) {
                CellType::Empty => '.',
                CellType::Straight => '=',
                CellType::Turn => 'L',
                CellType::Intersection => '+',
                CellType::TJunction => 'T',
                CellType::DeadEnd => 'o',
            })
            .collect();
        println!("  {}", row);
    }
    println!("  {} tiles, {} buildings", layout.tiles.len(), layout.buildings.len());
    println!();

    let mut ufos = UfoGenerator::new(UfoConfig::default())?;
    println!("UFOs:");
    for ufo in ufos.regenerate()? {
        println!(
            "  #{} seed {} {:?}: {} parts",
            ufo.index,
            ufo.seed.value,
            ufo.variant,
            ufo.root.node_count() - 1
        );
    }
    println!();

    let mut collector = MeshCollector::new();
    plants.emit(&mut collector);
    streets.emit(&mut collector);
    ufos.emit(&mut collector);
    println!(
        "Scene: {} submissions, {} vertices, {} triangles",
        collector.submissions,
        collector.mesh.vertex_count(),
        collector.mesh.triangle_count()
    );

    Ok(())
}
