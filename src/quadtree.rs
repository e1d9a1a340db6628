use glam::Vec2;

const EPSILON: f32 = 1e-3;
const MAX_DEPTH: usize = 32;
const NO_CHILD: u32 = u32::MAX;

/// Barnes-Hut quadtree.
/// Cells live in one arena; a cell is empty, a leaf holding one (possibly merged)
/// body, or an inner cell whose mass is the sum of its children.
#[derive(Debug)]
pub struct QuadTree {
    cells: Vec<Cell>,
    bodies: usize,
}

#[derive(Debug)]
struct Cell {
    boundary: BoundingBox2D,
    mass: f32,
    // Sum of `position * mass` of everything below this cell.
    weighted: Vec2,
    children: [u32; 4],
    inner: bool,
}

/// A body or a group of bodies reduced to its center of mass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassPoint {
    pub position: Vec2,
    pub mass: f32,
}

impl Cell {
    fn new(boundary: BoundingBox2D) -> Self {
        Self {
            boundary,
            mass: 0.0,
            weighted: Vec2::ZERO,
            children: [NO_CHILD; 4],
            inner: false,
        }
    }

    fn center_of_mass(&self) -> Vec2 {
        self.weighted / self.mass
    }

    fn absorb(&mut self, position: Vec2, mass: f32) {
        self.weighted += position * mass;
        self.mass += mass;
    }
}

impl QuadTree {
    pub fn new(boundary: BoundingBox2D) -> Self {
        Self::with_capacity(boundary, 0)
    }

    pub fn with_capacity(boundary: BoundingBox2D, capacity: usize) -> Self {
        let mut cells = Vec::with_capacity(capacity * 2 + 1);
        cells.push(Cell::new(boundary));
        Self { cells, bodies: 0 }
    }

    /// Number of inserted bodies.
    pub fn len(&self) -> usize {
        self.bodies
    }

    pub fn is_empty(&self) -> bool {
        self.bodies == 0
    }

    pub fn total_mass(&self) -> f32 {
        self.cells[0].mass
    }

    /// `None` while the tree is empty.
    pub fn center_of_mass(&self) -> Option<Vec2> {
        let root = &self.cells[0];
        (root.mass > 0.0).then(|| root.center_of_mass())
    }

    /// Inserts a body. Bodies without positive mass are ignored.
    pub fn insert(&mut self, position: Vec2, mass: f32) {
        if mass <= 0.0 || !mass.is_finite() {
            return;
        }
        self.bodies += 1;

        let mut index = 0;
        for depth in 0.. {
            let cell = &mut self.cells[index];

            if !cell.inner {
                if cell.mass == 0.0 {
                    cell.absorb(position, mass);
                    return;
                }

                // Bodies on top of each other, or a tree that ran out of
                // resolution, share one leaf.
                let resident = cell.center_of_mass();
                if resident.distance(position) < EPSILON || depth >= MAX_DEPTH {
                    cell.absorb(position, mass);
                    return;
                }

                let resident_mass = cell.mass;
                cell.inner = true;
                let section = cell.boundary.section(&resident);
                let child = self.child(index, section);
                self.cells[child].absorb(resident, resident_mass);
            }

            self.cells[index].absorb(position, mass);
            let section = self.cells[index].boundary.section(&position);
            index = self.child(index, section);
        }
    }

    /// Returns the bodies that act on `position`, following the Barnes-Hut rule:
    /// a cell whose `size / distance` is below `theta` is reduced to its center
    /// of mass. A `theta` of `0.0` returns every single body.
    /// Bodies closer than a small epsilon are skipped so a body never acts on itself.
    pub fn approximations(&self, position: &Vec2, theta: f32) -> Vec<MassPoint> {
        let mut points = vec![];
        let mut stack = vec![0_usize];

        while let Some(index) = stack.pop() {
            let cell = &self.cells[index];
            if cell.mass == 0.0 {
                continue;
            }

            let center = cell.center_of_mass();
            let dist = center.distance(*position);
            let size = cell.boundary.width.max(cell.boundary.height);

            if !cell.inner || size / dist < theta {
                if dist > EPSILON {
                    points.push(MassPoint {
                        position: center,
                        mass: cell.mass,
                    });
                }
            } else {
                stack.extend(
                    cell.children
                        .iter()
                        .filter(|c| **c != NO_CHILD)
                        .map(|c| *c as usize),
                );
            }
        }
        points
    }

    fn child(&mut self, parent: usize, section: usize) -> usize {
        let existing = self.cells[parent].children[section];
        if existing != NO_CHILD {
            return existing as usize;
        }
        let boundary = self.cells[parent].boundary.sub_quadrant(section);
        self.cells.push(Cell::new(boundary));
        let index = self.cells.len() - 1;
        self.cells[parent].children[section] = index as u32;
        index
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox2D {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox2D {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Smallest box around `points`, never thinner than `1.0` on either axis.
    pub fn enclosing(points: &[Vec2]) -> Self {
        if points.is_empty() {
            return Self::new(Vec2::ZERO, 1.0, 1.0);
        }

        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        let size = (max - min).max(Vec2::ONE);
        Self::new(min + 0.5 * (max - min), size.x, size.y)
    }

    // Bit 0 is set right of the center, bit 1 above it.
    fn section(&self, loc: &Vec2) -> usize {
        let mut section = 0;
        if loc.x > self.center.x {
            section |= 0b01;
        }
        if loc.y > self.center.y {
            section |= 0b10;
        }
        section
    }

    pub fn sub_quadrant(&self, section: usize) -> Self {
        let dx = if section & 0b01 > 0 { 0.25 } else { -0.25 };
        let dy = if section & 0b10 > 0 { 0.25 } else { -0.25 };
        let shift = self.center + Vec2::new(dx * self.width, dy * self.height);
        Self::new(shift, self.width * 0.5, self.height * 0.5)
    }
}
