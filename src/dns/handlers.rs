use crate::config::SharedConfig;
use crate::error::Error;
use crate::zone::{AddressRecord, DynZoneStore};
use lazy_static::lazy_static;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::error;
use trust_dns_proto::rr::rdata::SOA;
use trust_dns_server::authority::MessageResponseBuilder;
use trust_dns_server::client::op::{Header, MessageType, OpCode, ResponseCode};
use trust_dns_server::client::rr::{LowerName, RData, Record, RecordType};
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

#[derive(Clone)]
pub struct Handler {
    config: SharedConfig,
    zone_store: DynZoneStore,
}

lazy_static! {
    static ref SERIAL_FORMATTER: &'static [time::format_description::FormatItem<'static>] =
        format_description!(version = 2, "[year][month][day]");
}

impl Handler {
    pub(super) fn new(config: SharedConfig, zone_store: DynZoneStore) -> Self {
        Handler { config, zone_store }
    }

    async fn dispatch_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response: R,
    ) -> Result<ResponseInfo, Error> {
        // If it isn't a query, return NOTIMPL.
        if request.op_code() != OpCode::Query || request.message_type() != MessageType::Query {
            return self.handle_notimpl(request, response).await;
        }

        // Otherwise handle by query type, or return NOTIMPL.
        match request.query().query_type() {
            RecordType::SOA => self.handle_request_soa(request, response).await,
            RecordType::A | RecordType::AAAA => self.handle_request_addr(request, response).await,
            RecordType::NS => self.handle_request_ns(request, response).await,
            _ => self.handle_notimpl(request, response).await,
        }
    }

    async fn handle_notimpl<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let response = MessageResponseBuilder::from_message_request(request);
        Ok(response_handle
            .send_response(response.error_msg(request.header(), ResponseCode::NotImp))
            .await?)
    }

    async fn handle_request_soa<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let query_name = request.query().name();
        if *query_name != self.config.domain {
            return self.send_nxdomain(request, response_handle).await;
        }

        // NB: unwraps are safe: known date format producing values that will always parse as u32.
        let serial: u32 = OffsetDateTime::now_utc()
            .format(&SERIAL_FORMATTER)
            .unwrap()
            .parse()
            .unwrap();
        let ns_admin = self.config.ns_admin()?;
        // See RIPE 203[0] for recommended values.
        // [0]: https://www.ripe.net/publications/docs/ripe-203
        let soa_rdata = RData::SOA(SOA::new(
            self.config.ns_domain.clone().into(),
            ns_admin,
            serial,
            86_400,    // 24 hrs.
            7_200,     // 2 hours.
            3_600_000, // 1000 hours.
            172_800,   // 2 days.
        ));
        self.send_auth_resp(request, response_handle, vec![soa_rdata])
            .await
    }

    async fn handle_request_addr<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let fqdn = request.query().name();
        let record = self.zone_store.read().await.get(fqdn).await;
        match record {
            // Names without addresses only exist at the zone apex.
            None if *fqdn != self.config.domain => {
                self.send_nxdomain(request, response_handle).await
            }
            record => {
                let query_type = request.query().query_type();
                let rdata = Self::addr_rdata(query_type, record.unwrap_or_default());
                self.send_auth_resp(request, response_handle, rdata).await
            }
        }
    }

    async fn handle_request_ns<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let fqdn = request.query().name();
        match self.config.ns_records.get(fqdn) {
            None => self.send_nxdomain(request, response_handle).await,
            Some(_) => {
                self.send_auth_resp(request, response_handle, self.ns_rdata(fqdn))
                    .await
            }
        }
    }

    fn addr_rdata(query_type: RecordType, record: AddressRecord) -> Vec<RData> {
        match query_type {
            RecordType::A => record.a.map(RData::A).into_iter().collect(),
            RecordType::AAAA => record.aaaa.map(RData::AAAA).into_iter().collect(),
            _ => Vec::default(),
        }
    }

    fn ns_names_from_config(&self, fqdn: &LowerName) -> Vec<LowerName> {
        self.config
            .ns_records
            .get(fqdn)
            .map_or(Vec::default(), Clone::clone)
    }

    fn ns_rdata(&self, fqdn: &LowerName) -> Vec<RData> {
        self.ns_names_from_config(fqdn)
            .iter()
            .map(|n| RData::NS(n.into()))
            .collect()
    }

    async fn send_auth_resp<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
        rdata: Vec<RData>,
    ) -> Result<ResponseInfo, Error> {
        let ttl = self.config.record_ttl;
        let records: Vec<Record> = rdata
            .iter()
            .map(|rd| Record::from_rdata(request.query().name().into(), ttl, rd.clone()))
            .collect();
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, records.iter(), &[], &[], &[]);
        Ok(response_handle.send_response(response).await?)
    }

    async fn send_nxdomain<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        header.set_response_code(ResponseCode::NXDomain);
        let response = builder.build_no_records(header);
        Ok(response_handle.send_response(response).await?)
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        match self.dispatch_request(request, response_handle).await {
            Ok(info) => info,
            Err(error) => {
                error!("error in RequestHandler: {:?}", error);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}
