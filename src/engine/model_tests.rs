use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use emath::{pos2, vec2, Pos2, Rect};

use super::{
    ContainerData, ContainerId, DragContext, DragHost, DragOptions, ElementId, NodeId,
    PointerButton,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed ^ 0xD4A6_D4A6_D4A6_D4A6)
    }

    fn next_u64(&mut self) -> u64 {
        // Simple LCG: deterministic, fast, no dependency.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005u64)
            .wrapping_add(1442695040888963407u64);
        self.0
    }

    fn next_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() as usize) % upper
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() & 1) != 0
    }

    fn next_f32(&mut self, upper: f32) -> f32 {
        (self.next_u64() % 1000) as f32 / 1000.0 * upper
    }
}

const LANE_W: f32 = 100.0;
const LANE_GAP: f32 = 50.0;
const LANE_H: f32 = 400.0;
const ROW: f32 = 20.0;
const CHANNEL: &str = "model";

struct MiniHost {
    rects: BTreeMap<NodeId, Rect>,
    next_node: u64,
}

impl MiniHost {
    fn new() -> Self {
        Self {
            rects: BTreeMap::new(),
            next_node: 0,
        }
    }

    fn node(&mut self, rect: Rect) -> NodeId {
        self.next_node += 1;
        let node = NodeId(self.next_node);
        self.rects.insert(node, rect);
        node
    }
}

impl DragHost for MiniHost {
    fn node_rect(&self, node: NodeId) -> Rect {
        self.rects[&node]
    }

    fn create_clone(&mut self, _source: NodeId, rect: Rect) -> NodeId {
        self.node(rect)
    }

    fn move_clone(&mut self, clone: NodeId, to: Pos2) {
        let size = self.rects[&clone].size();
        self.rects.insert(clone, Rect::from_min_size(to, size));
    }

    fn create_ghost(&mut self, source: NodeId) -> NodeId {
        let rect = self.rects[&source];
        self.node(rect)
    }

    fn place_ghost(&mut self, _ghost: NodeId, _container: NodeId, _before: Option<NodeId>) {}

    fn remove_node(&mut self, node: NodeId) {
        self.rects.remove(&node);
    }

    fn data_changed(&mut self, _container: NodeId) {}
}

struct Lane {
    id: ContainerId,
    data: ContainerData<u32>,
    elements: Vec<ElementId>,
    origin: Pos2,
}

struct World {
    ctx: DragContext<u32>,
    host: MiniHost,
    lanes: Vec<Lane>,
}

impl World {
    fn new(lane_count: usize, items_per_lane: usize, next_item: &mut u32) -> Self {
        let mut world = Self {
            ctx: DragContext::with_options(DragOptions {
                debug_integrity: true,
                ..Default::default()
            }),
            host: MiniHost::new(),
            lanes: Vec::new(),
        };
        for i in 0..lane_count {
            let origin = pos2(i as f32 * (LANE_W + LANE_GAP), 0.0);
            let data: ContainerData<u32> = Rc::new(RefCell::new(
                (0..items_per_lane)
                    .map(|_| {
                        *next_item += 1;
                        *next_item
                    })
                    .collect(),
            ));
            let node = world
                .host
                .node(Rect::from_min_size(origin, vec2(LANE_W, LANE_H)));
            let id = world
                .ctx
                .attach_container(CHANNEL, node, Rc::clone(&data), None);
            world.lanes.push(Lane {
                id,
                data,
                elements: Vec::new(),
                origin,
            });
            world.sync_lane(i);
        }
        world
    }

    fn row_rect(origin: Pos2, index: usize) -> Rect {
        Rect::from_min_size(origin + vec2(0.0, ROW * index as f32), vec2(LANE_W, ROW))
    }

    /// Emulate the binding layer re-rendering a lane: throw the old element
    /// nodes away and attach one fresh element per data entry, in order.
    fn sync_lane(&mut self, index: usize) {
        let stale = std::mem::take(&mut self.lanes[index].elements);
        for element in stale {
            self.ctx.detach_element(element);
        }
        let origin = self.lanes[index].origin;
        let id = self.lanes[index].id;
        let count = self.lanes[index].data.borrow().len();
        let fresh = (0..count)
            .map(|row| {
                let node = self.host.node(Self::row_rect(origin, row));
                self.ctx.attach_element(id, node)
            })
            .collect();
        self.lanes[index].elements = fresh;
    }

    fn sync_all(&mut self) {
        for index in 0..self.lanes.len() {
            self.sync_lane(index);
        }
    }

    /// Recycle a lane the way a host re-creating a widget would: detach the
    /// container and attach a replacement over the same data sequence.
    fn recycle_lane(&mut self, index: usize) {
        let old = self.lanes[index].id;
        assert!(self.ctx.detach_container(old));
        let origin = self.lanes[index].origin;
        let data = Rc::clone(&self.lanes[index].data);
        let node = self
            .host
            .node(Rect::from_min_size(origin, vec2(LANE_W, LANE_H)));
        self.lanes[index].id = self.ctx.attach_container(CHANNEL, node, data, None);
        self.lanes[index].elements.clear();
        self.sync_lane(index);
    }

    fn items_snapshot(&self) -> Vec<u32> {
        let mut items: Vec<u32> = self
            .lanes
            .iter()
            .flat_map(|lane| lane.data.borrow().clone())
            .collect();
        items.sort_unstable();
        items
    }

    fn assert_healthy(&self, expected: &[u32], step: usize) {
        let issues = self.ctx.integrity_issues();
        assert!(
            issues.is_empty(),
            "step {step}: integrity failed:\n{}",
            issues.join("\n")
        );
        assert_eq!(
            self.items_snapshot(),
            expected,
            "step {step}: items not conserved"
        );
    }
}

#[test]
fn model_random_drags_conserve_items_and_integrity() {
    for seed in 1u64..=8u64 {
        let mut rng = Rng::new(seed);
        let mut next_item = 0u32;
        let mut world = World::new(3, 4, &mut next_item);
        let mut expected: Vec<u32> = world.items_snapshot();

        for step in 0..150 {
            let recycle = rng.next_u64() % 11 == 0;
            let edit = rng.next_u64() % 7 == 0;

            if recycle {
                let index = rng.next_usize(world.lanes.len());
                world.recycle_lane(index);
                world.assert_healthy(&expected, step);
                continue;
            }

            if edit {
                // External edits while idle: the caller mutates a sequence
                // and the binding layer follows up.
                let index = rng.next_usize(world.lanes.len());
                if rng.next_bool() {
                    next_item += 1;
                    let position = {
                        let mut data = world.lanes[index].data.borrow_mut();
                        let position = rng.next_usize(data.len() + 1);
                        data.insert(position, next_item);
                        position
                    };
                    // Granular binding: one new node dropped in mid-list.
                    let origin = world.lanes[index].origin;
                    let id = world.lanes[index].id;
                    let node = world.host.node(World::row_rect(origin, position));
                    let element = world.ctx.attach_element_at(id, node, position);
                    world.lanes[index].elements.insert(position, element);
                    expected.push(next_item);
                    expected.sort_unstable();
                    world.assert_healthy(&expected, step);
                    world.sync_lane(index);
                } else {
                    let removed = {
                        let mut data = world.lanes[index].data.borrow_mut();
                        if data.is_empty() {
                            None
                        } else {
                            let position = rng.next_usize(data.len());
                            Some(data.remove(position))
                        }
                    };
                    if let Some(item) = removed {
                        expected.retain(|candidate| *candidate != item);
                        world.sync_lane(index);
                    }
                }
                world.assert_healthy(&expected, step);
                continue;
            }

            // A drag: pick any non-empty lane and element, wander, release
            // or cancel.
            let populated: Vec<usize> = (0..world.lanes.len())
                .filter(|i| !world.lanes[*i].data.borrow().is_empty())
                .collect();
            if populated.is_empty() {
                continue;
            }
            let lane_index = populated[rng.next_usize(populated.len())];
            let row = rng.next_usize(world.lanes[lane_index].elements.len());
            let origin = world.lanes[lane_index].origin;
            let grab = origin + vec2(LANE_W / 2.0, ROW * row as f32 + ROW / 2.0);

            let lane_id = world.lanes[lane_index].id;
            let element = world.lanes[lane_index].elements[row];
            world
                .ctx
                .start_drag(&mut world.host, CHANNEL, grab, lane_id, element);
            assert!(world.ctx.is_dragging(), "step {step}: drag did not start");

            let total_width = world.lanes.len() as f32 * (LANE_W + LANE_GAP);
            for _ in 0..rng.next_usize(4) {
                let point = pos2(rng.next_f32(total_width), rng.next_f32(LANE_H + 100.0) - 50.0);
                world.ctx.pointer_moved(&mut world.host, point);
            }

            if rng.next_u64() % 5 == 0 {
                world.ctx.cancel_drag(&mut world.host);
            } else {
                world
                    .ctx
                    .pointer_released(&mut world.host, PointerButton::Primary);
            }
            assert!(!world.ctx.is_dragging(), "step {step}: drag did not end");
            world.ctx.apply_pending(&mut world.host);
            world.sync_all();
            world.assert_healthy(&expected, step);
        }
    }
}
