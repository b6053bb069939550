//! Shared test values with hand-written serialization callbacks.

#![allow(dead_code)]

use treewrap::{
    Adapter, Decodable, DecodeError, Decoder, Encodable, EncodeError, Encoder, Storage,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Encodable for Point {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut map = encoder.container_keyed()?;
        map.encode_field("x", &self.x)?;
        map.encode_field("y", &self.y)?;
        Ok(())
    }
}

impl Decodable for Point {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut map = decoder.container_keyed()?;
        Ok(Point {
            x: map.decode_field("x")?,
            y: map.decode_field("y")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub nickname: Option<String>,
    pub tags: Vec<String>,
}

impl Encodable for Person {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut map = encoder.container_keyed()?;
        map.encode_field("name", &self.name)?;
        map.encode_field("age", &self.age)?;
        map.encode_field("nickname", &self.nickname)?;
        map.encode_field("tags", &self.tags)?;
        Ok(())
    }
}

impl Decodable for Person {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut map = decoder.container_keyed()?;
        Ok(Person {
            name: map.decode_field("name")?,
            age: map.decode_field("age")?,
            nickname: map.decode_field("nickname")?,
            tags: map.decode_field("tags")?,
        })
    }
}

/// Base value for delegation tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u64,
}

impl Encodable for Entity {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut map = encoder.container_keyed()?;
        map.encode_field("id", &self.id)?;
        Ok(())
    }
}

impl Decodable for Entity {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut map = decoder.container_keyed()?;
        Ok(Entity {
            id: map.decode_field("id")?,
        })
    }
}

/// Derived value whose callbacks route the base part through a delegate
/// session under the `"base"` key.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub entity: Entity,
    pub role: String,
}

impl Encodable for Employee {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut map = encoder.container_keyed()?;
        map.encode_field("role", &self.role)?;
        let mut base = map.delegate_encoder("base")?;
        base.encode_value(&self.entity)?;
        base.finish()
    }
}

impl Decodable for Employee {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut map = decoder.container_keyed()?;
        let role = map.decode_field("role")?;
        let mut base = map.delegate_decoder("base")?;
        let entity = base.decode_value()?;
        Ok(Employee { entity, role })
    }
}

/// A value whose callbacks open nested container handles by hand instead
/// of routing children through `Encodable`/`Decodable` composites.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub title: String,
    pub origin: Point,
    pub waypoints: Vec<Point>,
}

impl Encodable for Outline {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut map = encoder.container_keyed()?;
        map.encode_field("title", &self.title)?;
        let mut meta = map.nested_keyed("meta")?;
        meta.encode_field("origin", &self.origin)?;
        let mut seq = meta.nested_unkeyed("waypoints")?;
        for point in &self.waypoints {
            seq.encode_element(point)?;
        }
        Ok(())
    }
}

impl Decodable for Outline {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut map = decoder.container_keyed()?;
        let title = map.decode_field("title")?;
        let mut meta = map.nested_keyed("meta")?;
        let origin = meta.decode_field("origin")?;
        let mut seq = meta.nested_unkeyed("waypoints")?;
        let mut waypoints = Vec::new();
        while !seq.is_exhausted() {
            waypoints.push(seq.decode_element()?);
        }
        Ok(Outline {
            title,
            origin,
            waypoints,
        })
    }
}

/// A value no adapter can represent: native-only with no scalar form.
#[derive(Debug, Clone, PartialEq)]
pub struct Unrepresentable;

impl Encodable for Unrepresentable {
    const NATIVE_ONLY: bool = true;

    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        Err(EncodeError::InvalidValue {
            path: encoder.path().clone(),
        })
    }
}

/// A value whose callback requests nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyThing;

impl Encodable for EmptyThing {
    fn encode<S: Storage, A: Adapter>(
        &self,
        _encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        Ok(())
    }
}
