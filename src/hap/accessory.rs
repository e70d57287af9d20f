//! HAP accessories.
//!
//! An accessory carries the mandatory accessory-information service (built
//! from its [`AccessoryConfig`]) followed by the services added by the
//! application. Instance ids are assigned in insertion order, starting at 1.

use super::characteristic::Characteristic;
use super::service::Service;
use super::value::HapStatus;
use uuid::Uuid;

/// Accessory id, unique within one bridge.
pub type Aid = u32;

/// Routine run when a controller asks the accessory to identify itself.
pub type IdentifyRoutine = fn(&Accessory) -> HapStatus;

/// Accessory category advertised to controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Bridge = 2,
}

/// Everything needed to create an accessory.
#[derive(Clone)]
pub struct AccessoryConfig {
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub serial_num: String,
    pub fw_rev: String,
    /// Hardware revision, omitted from the accessory when absent
    pub hw_rev: Option<String>,
    /// HAP protocol version
    pub pv: String,
    pub cid: Category,
    pub identify_routine: IdentifyRoutine,
}

/// A HAP accessory.
pub struct Accessory {
    aid: Aid,
    config: AccessoryConfig,
    services: Vec<Service>,
    next_iid: u64,
}

impl Accessory {
    /// Create an accessory with its accessory-information service.
    pub fn new(config: AccessoryConfig) -> Self {
        let mut info = Service::accessory_information();
        info.add_char(Characteristic::identify());
        info.add_char(Characteristic::manufacturer(&config.manufacturer));
        info.add_char(Characteristic::model(&config.model));
        info.add_char(Characteristic::name(config.name.clone()));
        info.add_char(Characteristic::serial_number(&config.serial_num));
        info.add_char(Characteristic::firmware_revision(&config.fw_rev));
        if let Some(hw_rev) = &config.hw_rev {
            info.add_char(Characteristic::hardware_revision(hw_rev));
        }

        let mut accessory = Self {
            aid: 0,
            config,
            services: Vec::new(),
            next_iid: 1,
        };
        accessory.add_service(info);
        accessory
    }

    /// Add a service and number its characteristics.
    pub fn add_service(&mut self, mut service: Service) {
        self.next_iid = service.assign_iids(self.next_iid);
        self.services.push(service);
    }

    /// Accessory id, 0 until the accessory is registered.
    pub fn aid(&self) -> Aid {
        self.aid
    }

    pub(crate) fn set_aid(&mut self, aid: Aid) {
        self.aid = aid;
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration the accessory was created from.
    pub fn config(&self) -> &AccessoryConfig {
        &self.config
    }

    /// Services, accessory information first.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// First service of the given type, if the accessory has one.
    pub fn get_serv_by_type(&self, type_uuid: Uuid) -> Option<&Service> {
        self.services.iter().find(|s| s.type_uuid() == type_uuid)
    }

    /// Locate a characteristic by instance id, together with its service.
    pub fn find_char(&self, iid: u64) -> Option<(&Service, &Characteristic)> {
        self.services
            .iter()
            .find_map(|service| service.get_char_by_iid(iid).map(|c| (service, c)))
    }

    /// Run the identify routine.
    pub fn identify(&self) -> HapStatus {
        (self.config.identify_routine)(self)
    }
}
