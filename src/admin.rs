use std::ffi::CString;
use std::os::raw::c_char;
use std::time::Instant;

use rdkafka::client::{Client, DefaultClientContext};
use rdkafka::config::ClientConfig;
use rdkafka_sys as rdsys;
use rdkafka_sys::types::{
    RDKafkaAdminOp, RDKafkaErrorCode, RDKafkaResourceType, RDKafkaRespErr, RDKafkaType,
};
use tracing::{debug, info};

use crate::app_config::AppConfig;
use crate::error::{AlterError, AlterResult, SetupStage};
use crate::native::{
    cstr_to_owned, timeout_ms, ErrBuf, NativeAdminOptions, NativeConfigResource, NativeEvent,
    NativeQueue,
};
use crate::outcome::{self, ErrorDetail, EventKind, EventSummary, ResourceResult};
use crate::request::ConfigChangeRequest;

/// Producer-role client plus a handle on its main queue.
pub struct AdminSession {
    // Field order is drop order: the queue reference goes before the client.
    queue: NativeQueue,
    client: Client<DefaultClientContext>,
}

impl AdminSession {
    pub fn connect(brokers: &str) -> AlterResult<Self> {
        info!("Connecting admin client to {}", brokers);

        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", brokers)
            .set("allow.auto.create.topics", "false");

        let native_config = config
            .create_native_config()
            .map_err(|e| AlterError::Config(e.to_string()))?;

        // librdkafka has no admin client type; a producer is the lighter of the two.
        let client = Client::new(
            &config,
            native_config,
            RDKafkaType::RD_KAFKA_PRODUCER,
            DefaultClientContext,
        )
        .map_err(|e| AlterError::ClientCreate(e.to_string()))?;

        let queue = unsafe { NativeQueue::from_ptr(rdsys::rd_kafka_queue_get_main(client.native_ptr())) }
            .ok_or_else(|| AlterError::ClientCreate("main queue unavailable".to_string()))?;

        Ok(Self { queue, client })
    }

    /// Sends one AlterConfigs request and waits once for its result.
    pub fn alter_topic_config(
        &self,
        request: &ConfigChangeRequest,
        config: &AppConfig,
    ) -> AlterResult<String> {
        let resource = topic_resource(request)?;
        let options = self.alter_options(config)?;

        let mut resources = [resource.ptr()];
        unsafe {
            rdsys::rd_kafka_AlterConfigs(
                self.client.native_ptr(),
                resources.as_mut_ptr(),
                resources.len(),
                options.ptr(),
                self.queue.ptr(),
            );
        }
        debug!(
            topic = %request.topic,
            key = %request.key,
            "AlterConfigs dispatched, polling for {:?}",
            config.poll_timeout
        );

        let started = Instant::now();
        let event = unsafe {
            NativeEvent::from_ptr(rdsys::rd_kafka_queue_poll(
                self.queue.ptr(),
                timeout_ms(config.poll_timeout),
            ))
        };
        debug!(elapsed = ?started.elapsed(), received = event.is_some(), "Admin queue poll returned");

        outcome::classify(event.as_ref().map(summarize), config.poll_timeout)
    }

    fn alter_options(&self, config: &AppConfig) -> AlterResult<NativeAdminOptions> {
        let setup = |message: String| AlterError::DispatchSetup {
            stage: SetupStage::SetTimeout,
            message,
        };

        let options = unsafe {
            NativeAdminOptions::from_ptr(rdsys::rd_kafka_AdminOptions_new(
                self.client.native_ptr(),
                RDKafkaAdminOp::RD_KAFKA_ADMIN_OP_ALTERCONFIGS,
            ))
        }
        .ok_or_else(|| setup("failed to allocate admin options".to_string()))?;

        let mut err_buf = ErrBuf::new();
        let res = unsafe {
            rdsys::rd_kafka_AdminOptions_set_request_timeout(
                options.ptr(),
                timeout_ms(config.request_timeout),
                err_buf.as_mut_ptr(),
                err_buf.capacity(),
            )
        };
        if is_error(res) {
            return Err(setup(err_buf.to_string()));
        }

        Ok(options)
    }
}

/// Alters `request.key` on `request.topic`, releasing every native handle
/// before returning.
pub fn alter_topic_config(request: &ConfigChangeRequest, config: &AppConfig) -> AlterResult<String> {
    let session = AdminSession::connect(&request.brokers)?;
    session.alter_topic_config(request, config)
}

/// One TOPIC descriptor carrying the single key/value pair.
fn topic_resource(request: &ConfigChangeRequest) -> AlterResult<NativeConfigResource> {
    let setup = |message: String| AlterError::DispatchSetup {
        stage: SetupStage::SetConfig,
        message,
    };

    let topic = CString::new(request.topic.as_str()).map_err(|e| setup(format!("topic: {e}")))?;
    let key = CString::new(request.key.as_str()).map_err(|e| setup(format!("key: {e}")))?;
    let value = CString::new(request.value.as_str()).map_err(|e| setup(format!("value: {e}")))?;

    let resource = unsafe {
        NativeConfigResource::from_ptr(rdsys::rd_kafka_ConfigResource_new(
            RDKafkaResourceType::RD_KAFKA_RESOURCE_TOPIC,
            topic.as_ptr(),
        ))
    }
    .ok_or_else(|| setup(format!("invalid topic resource `{}`", request.topic)))?;

    let res = unsafe {
        rdsys::rd_kafka_ConfigResource_set_config(resource.ptr(), key.as_ptr(), value.as_ptr())
    };
    if is_error(res) {
        return Err(setup(RDKafkaErrorCode::from(res).to_string()));
    }

    Ok(resource)
}

fn summarize(event: &NativeEvent) -> EventSummary {
    let ptr = event.ptr();

    let event_type = unsafe { rdsys::rd_kafka_event_type(ptr) } as i32;
    let name = unsafe { cstr_to_owned(rdsys::rd_kafka_event_name(ptr)) }.unwrap_or_default();
    let error_string = unsafe { cstr_to_owned(rdsys::rd_kafka_event_error_string(ptr)) };
    let error = unsafe {
        error_detail(
            rdsys::rd_kafka_event_error(ptr),
            rdsys::rd_kafka_event_error_string(ptr),
        )
    };

    let kind = if event_type == rdsys::RD_KAFKA_EVENT_ALTERCONFIGS_RESULT as i32 {
        EventKind::AlterConfigsResult
    } else if event_type == rdsys::RD_KAFKA_EVENT_ERROR as i32 {
        EventKind::Error
    } else {
        EventKind::Other
    };

    let resources = match kind {
        EventKind::AlterConfigsResult => unsafe { alter_configs_resources(event) },
        _ => Vec::new(),
    };

    EventSummary {
        kind,
        event_type,
        name,
        error,
        error_string,
        resources,
    }
}

/// # Safety
///
/// `event` must be an AlterConfigs result event.
unsafe fn alter_configs_resources(event: &NativeEvent) -> Vec<ResourceResult> {
    let result = rdsys::rd_kafka_event_AlterConfigs_result(event.ptr());
    if result.is_null() {
        return Vec::new();
    }

    let mut n = 0;
    let resources = rdsys::rd_kafka_AlterConfigs_result_resources(result, &mut n);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let resource = *resources.add(i);
        out.push(ResourceResult {
            name: cstr_to_owned(rdsys::rd_kafka_ConfigResource_name(resource)).unwrap_or_default(),
            error: error_detail(
                rdsys::rd_kafka_ConfigResource_error(resource),
                rdsys::rd_kafka_ConfigResource_error_string(resource),
            ),
        });
    }
    out
}

/// # Safety
///
/// `message` must be null or a NUL-terminated string.
unsafe fn error_detail(err: RDKafkaRespErr, message: *const c_char) -> Option<ErrorDetail> {
    if !is_error(err) {
        return None;
    }
    Some(ErrorDetail {
        code: err as i32,
        message: cstr_to_owned(message).unwrap_or_else(|| RDKafkaErrorCode::from(err).to_string()),
    })
}

fn is_error(err: RDKafkaRespErr) -> bool {
    err as i32 != RDKafkaRespErr::RD_KAFKA_RESP_ERR_NO_ERROR as i32
}
