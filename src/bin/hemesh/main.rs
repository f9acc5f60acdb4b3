//! hemesh CLI - runs the mesh operators on built-in shapes.
//!
//! Usage: hemesh <COMMAND> [OPTIONS]
//!
//! Run `hemesh --help` for available commands. Set `RUST_LOG=debug` to see
//! construction and pass statistics.

use clap::{Parser, Subcommand, ValueEnum};

use hemesh::algo::{inflate_deflate, laplacian_smooth_sharpen, LaplacianMode, LaplacianOptions};
use hemesh::mesh::{HalfEdgeMesh, PolygonSoup, VertexId};
use hemesh::render::RenderCache;

#[derive(Parser)]
#[command(name = "hemesh")]
#[command(author, version, about = "Half-edge mesh operators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Smooth or sharpen a mesh
    Smooth {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Height of a bump raised at the grid's center vertex
        #[arg(long, default_value = "0.0")]
        bump: f64,

        /// Number of passes
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Sharpen instead of smoothing
        #[arg(long)]
        sharpen: bool,

        /// Compute displacements on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Move one vertex along its normal
    Inflate {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Vertex id
        #[arg(short, long, default_value = "0")]
        vertex: usize,

        /// Distance to move; negative values deflate
        #[arg(short, long, allow_hyphen_values = true)]
        factor: f64,
    },
}

#[derive(clap::Args)]
struct ShapeArgs {
    /// Built-in shape
    #[arg(short, long, value_enum, default_value = "grid")]
    shape: Shape,

    /// Cells per side for the grid
    #[arg(short = 'n', long, default_value = "8")]
    size: usize,

    /// Grid cell size
    #[arg(long, default_value = "1.0")]
    spacing: f64,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Regular tetrahedron (closed)
    Tetrahedron,
    /// Single quad (open)
    Quad,
    /// Triangulated planar grid (open)
    Grid,
}

impl ShapeArgs {
    fn soup(&self) -> PolygonSoup {
        match self.shape {
            Shape::Tetrahedron => PolygonSoup::tetrahedron(),
            Shape::Quad => PolygonSoup::unit_quad(),
            Shape::Grid => PolygonSoup::grid(self.size.max(1), self.spacing),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { shape } => {
            let mesh = HalfEdgeMesh::from_soup(&shape.soup())?;
            print_info(&mesh);
        }

        Commands::Smooth {
            shape,
            bump,
            iterations,
            sharpen,
            parallel,
        } => {
            cmd_smooth(&shape, bump, iterations, sharpen, parallel)?;
        }

        Commands::Inflate {
            shape,
            vertex,
            factor,
        } => {
            cmd_inflate(&shape, vertex, factor)?;
        }
    }

    Ok(())
}

fn print_info(mesh: &HalfEdgeMesh) {
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Boundary half-edges: {}", mesh.boundary_halfedges().count());
    println!("Surface area: {:.6}", mesh.surface_area());

    let valences: Vec<usize> = mesh.vertex_ids().map(|v| mesh.valence(v)).collect();
    if let (Some(min), Some(max)) = (valences.iter().min(), valences.iter().max()) {
        let avg = valences.iter().sum::<usize>() as f64 / valences.len() as f64;
        println!("Valence: min {}, max {}, avg {:.2}", min, max, avg);
    }
}

fn cmd_smooth(
    shape: &ShapeArgs,
    bump: f64,
    iterations: usize,
    sharpen: bool,
    parallel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut soup = shape.soup();
    let center = soup.positions.len() / 2;
    if bump != 0.0 {
        if let Some(p) = soup.positions.get_mut(center) {
            p.z += bump;
        }
    }

    let mut mesh = HalfEdgeMesh::from_soup(&soup)?;
    let mut cache = RenderCache::new();
    let _ = cache.buffers(&mesh);

    let options = LaplacianOptions::default()
        .with_mode(LaplacianMode::from_smooth_flag(!sharpen))
        .with_iterations(iterations)
        .with_parallel(parallel);

    let before = *mesh.position(VertexId::new(center));
    let change = laplacian_smooth_sharpen(&mut mesh, &options)?;
    cache.invalidate(change);
    let after = *mesh.position(VertexId::new(center));

    println!("{:?} x{}: {:?}", options.mode, iterations, change);
    println!(
        "Center vertex {}: z {:.6} -> {:.6}",
        center, before.z, after.z
    );
    println!("Triangles to draw: {}", cache.buffers(&mesh).num_triangles());

    Ok(())
}

fn cmd_inflate(
    shape: &ShapeArgs,
    vertex: usize,
    factor: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = HalfEdgeMesh::from_soup(&shape.soup())?;
    let v = VertexId::new(vertex);
    mesh.check_vertex(v)?;

    let before = *mesh.position(v);
    let change = inflate_deflate(&mut mesh, v, factor)?;
    let after = *mesh.position(v);

    println!("{:?}", change);
    println!(
        "Vertex {}: ({:.6}, {:.6}, {:.6}) -> ({:.6}, {:.6}, {:.6})",
        vertex, before.x, before.y, before.z, after.x, after.y, after.z
    );

    Ok(())
}
