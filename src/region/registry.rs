use std::any::{type_name, Any};

use super::{AsyncRegion, RegionPolicy, RegionStatus};
use crate::error::RegionError;

/// Type-erased view of a region, enough for cross-region queries
trait ErasedRegion: Any {
    fn name(&self) -> &'static str;
    fn status(&self) -> RegionStatus;
    fn reset(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedRegion for AsyncRegion<T> {
    fn name(&self) -> &'static str {
        AsyncRegion::name(self)
    }

    fn status(&self) -> RegionStatus {
        AsyncRegion::status(self)
    }

    fn reset(&mut self) {
        AsyncRegion::reset(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Closed set of regions for one screen.
///
/// Names are fixed at construction; lookups never create regions.
pub struct RegionRegistry {
    regions: Vec<Box<dyn ErasedRegion>>,
}

pub struct RegistryBuilder {
    regions: Vec<Box<dyn ErasedRegion>>,
}

impl RegistryBuilder {
    pub fn region<T: 'static>(mut self, name: &'static str, policy: RegionPolicy) -> Self {
        self.regions.push(Box::new(AsyncRegion::<T>::new(name, policy)));
        self
    }

    pub fn build(self) -> Result<RegionRegistry, RegionError> {
        for (i, region) in self.regions.iter().enumerate() {
            if self.regions[..i].iter().any(|r| r.name() == region.name()) {
                return Err(RegionError::DuplicateRegion(region.name().to_string()));
            }
        }
        Ok(RegionRegistry {
            regions: self.regions,
        })
    }
}

impl RegionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            regions: Vec::new(),
        }
    }

    pub fn get<T: 'static>(&self, name: &str) -> Result<&AsyncRegion<T>, RegionError> {
        self.find(name)?
            .as_any()
            .downcast_ref::<AsyncRegion<T>>()
            .ok_or_else(|| RegionError::TypeMismatch {
                region: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn get_mut<T: 'static>(
        &mut self,
        name: &str,
    ) -> Result<&mut AsyncRegion<T>, RegionError> {
        let region = self
            .regions
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| RegionError::UnknownRegion(name.to_string()))?;
        region
            .as_any_mut()
            .downcast_mut::<AsyncRegion<T>>()
            .ok_or_else(|| RegionError::TypeMismatch {
                region: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn status(&self, name: &str) -> Result<RegionStatus, RegionError> {
        Ok(self.find(name)?.status())
    }

    /// Registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.regions.iter().map(|r| r.name()).collect()
    }

    pub fn is_any_loading(&self) -> bool {
        self.regions
            .iter()
            .any(|r| r.status() == RegionStatus::Loading)
    }

    /// Screen unmount: every region back to Idle, in-flight responses invalidated
    pub fn reset_all(&mut self) {
        for region in self.regions.iter_mut() {
            region.reset();
        }
    }

    fn find(&self, name: &str) -> Result<&dyn ErasedRegion, RegionError> {
        self.regions
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
            .ok_or_else(|| RegionError::UnknownRegion(name.to_string()))
    }
}
