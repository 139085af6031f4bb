//! The binary layout of spawnable products.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::*;
use crate::prefab::PrefabDom;

pub const SPAWNABLE_EXTENSION: &str = ".spawnable";

pub const MAGIC: [u8; 8] = [b'S', b'P', b'W', b'N', b' ', 0, 0, 1];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpawnableEntity {
    /// The persistent id of this entity.
    pub id: String,
    /// The name of this entity.
    pub name: String,
    /// The components of this entity, serialized as JSON.
    pub components: String,
}

/// A flattened, instantiable object graph produced from a prefab.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Spawnable {
    pub entities: Vec<SpawnableEntity>,
}

impl Spawnable {
    /// Flattens the container entity, the entities and the nested instances of a prefab
    /// document.
    pub fn from_prefab_dom(dom: &PrefabDom) -> Result<Self> {
        let mut spawnable = Spawnable::default();

        if let Some(container) = dom.get("ContainerEntity") {
            spawnable.push("ContainerEntity", container)?;
        }

        spawnable.push_instance(dom)?;
        Ok(spawnable)
    }

    fn push_instance(&mut self, instance: &PrefabDom) -> Result<()> {
        if let Some(entities) = instance.get("Entities").and_then(|v| v.as_object()) {
            for (alias, entity) in entities {
                self.push(alias, entity)?;
            }
        }

        if let Some(instances) = instance.get("Instances").and_then(|v| v.as_object()) {
            for (_, nested) in instances {
                self.push_instance(nested)?;
            }
        }

        Ok(())
    }

    fn push(&mut self, alias: &str, entity: &PrefabDom) -> Result<()> {
        let field = |name: &str| {
            entity
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or(alias)
                .to_owned()
        };

        let components = match entity.get("Components") {
            Some(components) => serde_json::to_string(components)?,
            None => "{}".to_owned(),
        };

        self.entities.push(SpawnableEntity {
            id: field("Id"),
            name: field("Name"),
            components,
        });

        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.write_u32::<LittleEndian>(self.entities.len() as u32)?;
        bincode::serialize_into(&mut bytes, self)?;
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MAGIC.len() || bytes[0..MAGIC.len()] != MAGIC[..] {
            bail!("[Spawnable] MAGIC number not match.");
        }

        let mut file = Cursor::new(&bytes[MAGIC.len()..]);
        let count = file.read_u32::<LittleEndian>()? as usize;
        let spawnable: Spawnable = bincode::deserialize_from(&mut file)?;

        if spawnable.entities.len() != count {
            bail!(
                "[Spawnable] entity count not match. (Expected: {}, Actual: {})",
                count,
                spawnable.entities.len()
            );
        }

        Ok(spawnable)
    }
}
