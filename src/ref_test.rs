// Reference model, slot `i` holds the entry for key `ref_key(i)`. Keys
// are big-endian so slot order and byte-wise key order agree.

#[derive(Clone)]
struct RefNode {
    key: Option<Vec<u8>>,
    value: Vec<u8>,
}

struct RefNodes {
    entries: Vec<RefNode>,
}

impl RefNodes {
    fn new(capacity: usize) -> RefNodes {
        let mut entries: Vec<RefNode> = Vec::with_capacity(capacity);
        (0..capacity).for_each(|_| {
            entries.push(RefNode {
                key: None,
                value: vec![],
            })
        });
        RefNodes { entries }
    }

    fn len(&self) -> usize {
        self.entries.iter().filter(|item| item.key.is_some()).count()
    }

    fn get(&self, i: usize) -> Option<Vec<u8>> {
        let entry = &self.entries[i];
        entry.key.as_ref().map(|_| entry.value.clone())
    }

    fn iter(&self) -> std::vec::IntoIter<(Vec<u8>, Vec<u8>)> {
        self.entries
            .iter()
            .filter_map(|item| match &item.key {
                Some(key) => Some((key.clone(), item.value.clone())),
                None => None,
            })
            .collect::<Vec<(Vec<u8>, Vec<u8>)>>()
            .into_iter()
    }

    fn set(&mut self, i: usize, value: Vec<u8>) -> Option<Vec<u8>> {
        let entry = &mut self.entries[i];
        let old_value = entry.key.as_ref().map(|_| entry.value.clone());
        entry.key = Some(ref_key(i));
        entry.value = value;
        old_value
    }
}

fn ref_key(i: usize) -> Vec<u8> {
    (i as u16).to_be_bytes().to_vec()
}

fn ref_value(v: u64) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}
