//! Random document generator used by the property-style tests, in the spirit
//! of the teacher's own internal fixture generator.

use jsondelta::{Node, Scalar};
use rand::Rng;
use std::collections::BTreeMap;

pub struct Params {
    pub array_size: usize,
    pub map_size: usize,
    pub depth: usize,
    pub key_len: usize,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            array_size: 4,
            map_size: 4,
            depth: 4,
            key_len: 6,
        }
    }
}

impl Params {
    pub fn gen<R: Rng>(&self, rng: &mut R) -> Node {
        self.gen_at(self.depth, rng)
    }

    fn gen_at<R: Rng>(&self, depth: usize, rng: &mut R) -> Node {
        if depth == 0 || rng.gen_ratio(1, 3) {
            rand_scalar(rng)
        } else if rng.gen_bool(0.5) {
            let len = rng.gen_range(0..=self.array_size);
            let children = (0..len).map(|_| self.gen_at(depth - 1, rng)).collect();
            Node::array(children, 0)
        } else {
            let len = rng.gen_range(0..=self.map_size);
            let children: BTreeMap<String, Node> = (0..len)
                .map(|_| (rand_key(rng, self.key_len), self.gen_at(depth - 1, rng)))
                .collect();
            Node::object(children, 0)
        }
    }
}

fn rand_key<R: Rng>(rng: &mut R, len: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    (0..=rng.gen_range(1..=len))
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

fn rand_scalar<R: Rng>(rng: &mut R) -> Node {
    let scalar = match rng.gen_range(0..4) {
        0 => Scalar::Null,
        1 => Scalar::Bool(rng.gen_bool(0.5)),
        2 => Scalar::number(rng.gen_range(-1000.0..1000.0)),
        _ => Scalar::string(rand_key(rng, 10)),
    };
    Node::value(scalar, 0)
}
