use glam::Vec3;
use thicket_procgen::{
    add_bottom_cap, bezier_revolution, cylinder, generate_building, BranchShape, BuildingRecipe,
    TileDims, TileKind, TileSet,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Geometry Synthesis Demo ===\n");

    let trunk = cylinder(0.5, 6.0, 16)?;
    println!("Cylinder r=0.5 h=6:");
    println!("  Vertices: {}", trunk.vertex_count());
    println!("  Triangles: {}", trunk.triangle_count());
    println!("  Open edges: {}", trunk.open_edge_count());
    println!();

    println!("Curved branches by order:");
    let mut parent_radius = 0.5;
    for order in 0..4 {
        let shape = BranchShape::for_order(order, parent_radius);
        let mesh = shape.build()?;
        println!(
            "  Order {}: base {:.3} top {:.3} length {:.3} tip {:?} ({} tris)",
            order,
            shape.base_radius,
            shape.top_radius,
            shape.length,
            shape.tip(),
            mesh.triangle_count()
        );
        parent_radius = mesh.bounds().extents().x;
    }
    println!();

    let profile = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.5, 0.0),
        Vec3::new(2.0, 0.5, 0.0),
        Vec3::new(3.0, 0.0, 0.0),
    ];
    let mut body = bezier_revolution(&profile, 32)?;
    add_bottom_cap(&mut body, 32)?;
    println!("Saucer body: {} vertices, bounds {:?}", body.vertex_count(), body.bounds());
    println!();

    let tiles = TileSet::new(TileDims::default())?;
    println!("Street tiles (cell 10, road 1):");
    for kind in TileKind::ALL {
        println!("  {:?}: {} triangles", kind, tiles.get(kind).triangle_count());
    }
    println!();

    println!("Building prefabs:");
    for recipe in BuildingRecipe::catalogue() {
        let building = generate_building(&recipe)?;
        let triangles: usize = building.parts().map(|(_, mesh, _)| mesh.triangle_count()).sum();
        println!("  {}: {} floors, {} triangles", recipe.name, recipe.floors, triangles);
    }

    Ok(())
}
